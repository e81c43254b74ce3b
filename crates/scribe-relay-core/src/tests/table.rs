use crate::{
    CommandError, CommandResult, CommandTable, Destination, DispatchError, Envelope, ErrorToast,
    ExecutionContext, GetCurrentTabId, GetSettings, NativeHandler, RegistryError, SendErrorToast,
    Settings, ToggleRecording,
    tests::support::{Harness, Parts, configured_settings, table_builder},
};

use serde_json::{Value, json};

struct FixedSettings;

#[async_trait::async_trait]
impl NativeHandler<GetSettings> for FixedSettings {
    async fn handle(&self, _args: (), _table: &CommandTable) -> CommandResult<Settings> {
        Ok(Settings::default())
    }
}

/// WHAT: A command invoked in its native context runs inline
/// WHY: Native calls must not go through the transport
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_native_context_when_invoking_then_handler_runs_inline() {
    // Given: The harness with its background detached from the bus
    let harness = Harness::start(Parts::default());
    harness.bus.detach(Destination::Background);

    // When: The background asks for the current tab
    let tab = harness.background.invoke::<GetCurrentTabId>(()).await.unwrap();

    // Then: The focused page is returned without a round trip
    assert_eq!(tab, harness.page_tab);
}

/// WHAT: A shimmed call reaches the native context and returns its typed result
/// WHY: Cross-context calls must look like local calls to the caller
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_injected_context_when_asking_for_current_tab_then_background_answers() {
    // Given: All contexts attached
    let harness = Harness::start(Parts::default());

    // When: The injected script asks for the current tab
    let tab = harness.injected.invoke::<GetCurrentTabId>(()).await.unwrap();

    // Then: The background's answer comes back typed
    assert_eq!(tab, harness.page_tab);
}

/// WHAT: A native handler's domain error is forwarded unmodified
/// WHY: Callers must see the original cause, not a re-wrapped one
#[tokio::test]
async fn given_no_active_tab_when_invoking_remotely_then_remote_error_with_original_cause() {
    // Given: No focused tab
    let harness = Harness::start(Parts::default());
    harness.pages.set_active(None);

    // When: The application page asks for the current tab
    let result = harness.application.invoke::<GetCurrentTabId>(()).await;

    // Then: The background's NoActiveTab arrives as the remote cause
    let err = result.err();
    assert_eq!(
        err.as_ref().and_then(DispatchError::remote_cause),
        Some(&CommandError::NoActiveTab)
    );
}

/// WHAT: Active-tab shims resolve the tab before sending
/// WHY: The injected script lives in whichever tab is focused
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_background_when_sending_error_toast_then_injected_context_shows_it() {
    // Given: All contexts attached
    let harness = Harness::start(Parts::default());
    let toast = ErrorToast {
        message: "Transcription failed".to_string(),
        detail: Some("HTTP 401".to_string()),
    };

    // When: The background forwards an error toast
    harness
        .background
        .invoke::<SendErrorToast>(toast.clone())
        .await
        .unwrap();

    // Then: The injected context's notifier received it verbatim
    assert_eq!(harness.notifier.toasts(), vec![toast]);
}

/// WHAT: An unreachable peer is a transport error
/// WHY: A missing callee must be a typed failure at the caller
#[tokio::test]
async fn given_application_page_gone_when_reading_settings_then_transport_error() {
    // Given: The application page context stopped listening
    let harness = Harness::start(Parts::default());
    assert!(harness.bus.detach(Destination::tab(
        harness.app_tab,
        ExecutionContext::ApplicationPage
    )));

    // When: The background reads settings
    let result = harness.background.invoke::<GetSettings>(()).await;

    // Then: Transport error
    assert!(matches!(result, Err(DispatchError::Transport { .. })));
}

/// WHAT: Recorder commands sent to a focused tab without an injected context are unreachable
/// WHY: A tab address names its context, so no other context in that tab receives the envelope
#[tokio::test]
async fn given_application_page_focused_when_toggling_from_background_then_transport_error() {
    // Given: The application page is the focused tab
    let harness = Harness::start(Parts::configured());
    harness.pages.set_active(Some(harness.app_tab));

    // When: The background toggles and sends a toast
    let toggle = harness.background.invoke::<ToggleRecording>(()).await;
    let toast = harness
        .background
        .invoke::<SendErrorToast>(ErrorToast {
            message: "Transcription failed".to_string(),
            detail: None,
        })
        .await;

    // Then: Both fail in transport; the application page never saw them
    assert!(matches!(toggle, Err(DispatchError::Transport { .. })));
    assert!(matches!(toast, Err(DispatchError::Transport { .. })));
    assert!(harness.capture.calls().is_empty());
    assert!(harness.notifier.toasts().is_empty());
}

/// WHAT: A table cannot be attached at another context's address
/// WHY: An inbox only ever receives envelopes for the context it serves
#[tokio::test]
async fn given_injected_table_when_attached_as_application_page_then_misplaced_table() {
    // Given: A running harness
    let harness = Harness::start(Parts::default());

    // When: Attaching the injected table at the application page's address
    let result = harness.bus.attach(
        Destination::tab(harness.app_tab, ExecutionContext::ApplicationPage),
        harness.injected.clone(),
    );

    // Then: Refused, and the application page still answers
    assert!(matches!(result, Err(RegistryError::MisplacedTable { .. })));
    assert!(harness.background.invoke::<GetSettings>(()).await.is_ok());
}

/// WHAT: Envelopes for commands native elsewhere are refused
/// WHY: A message must only be executed in its command's native context
#[tokio::test]
async fn given_envelope_for_other_context_when_serving_then_unknown_command() {
    // Given: The background table
    let harness = Harness::start(Parts::default());

    // When: It is handed a settings envelope
    let reply = harness
        .background
        .serve(Envelope::new("getSettings", Value::Null))
        .await;

    // Then: Refused with the receiving context named
    assert!(matches!(
        reply,
        Err(CommandError::UnknownCommand { context: ExecutionContext::Background, .. })
    ));
}

/// WHAT: Malformed arguments are an encoding error
/// WHY: Bad payloads must never reach a handler
#[tokio::test]
async fn given_malformed_arguments_when_serving_then_encoding_error() {
    // Given: The application page table
    let harness = Harness::start(Parts::default());

    // When: setSettings arrives with a number instead of a document
    let reply = harness
        .application
        .serve(Envelope::new("setSettings", json!(42)))
        .await;

    // Then: Encoding error, and nothing was stored
    assert!(matches!(reply, Err(CommandError::Encoding { .. })));
    assert_eq!(harness.store.document(), None);
}

/// WHAT: Envelopes serialize to the documented wire shape
/// WHY: Other contexts decode `{ commandName, args }`
#[test]
#[allow(clippy::unwrap_used)]
fn given_envelope_when_serialized_then_uses_command_name_and_args() {
    // Given: A toggle envelope
    let envelope = Envelope::new("toggleRecording", Value::Null);

    // When: Serialized
    let wire = serde_json::to_value(&envelope).unwrap();

    // Then: camelCase command name and an empty argument list
    assert_eq!(wire, json!({ "commandName": "toggleRecording", "args": [] }));
}

/// WHAT: A settings document arrives as the single positional argument
/// WHY: Arguments travel as a list on the wire
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_wire_envelope_with_document_when_serving_then_settings_stored() {
    // Given: A setSettings envelope decoded from the wire
    let harness = Harness::start(Parts::default());
    let settings = configured_settings();
    let wire = json!({ "commandName": "setSettings", "args": [settings] });
    let envelope: Envelope = serde_json::from_value(wire).unwrap();

    // When: Served by the application page
    let reply = harness.application.serve(envelope).await;

    // Then: Acknowledged and persisted
    assert_eq!(reply.unwrap(), Value::Null);
    assert_eq!(harness.stored_settings(), settings);
}

/// WHAT: More than one positional argument is an encoding error
/// WHY: Every command takes at most one payload
#[tokio::test]
async fn given_two_arguments_when_serving_then_encoding_error() {
    // Given: A setSettings envelope carrying two documents
    let harness = Harness::start(Parts::default());
    let envelope = Envelope {
        command_name: "setSettings".to_string(),
        args: vec![json!({}), json!({})],
    };

    // When: Served
    let reply = harness.application.serve(envelope).await;

    // Then: Encoding error, and nothing was stored
    assert!(matches!(reply, Err(CommandError::Encoding { .. })));
    assert_eq!(harness.store.document(), None);
}

/// WHAT: Registering a handler in the wrong context fails
/// WHY: Exactly one native context per command, checked at build time
#[tokio::test]
async fn given_background_builder_when_registering_settings_handler_then_wrong_context() {
    // Given: A background table builder
    let harness = Harness::start(Parts::default());
    let builder = table_builder(ExecutionContext::Background, &harness.bus, &harness.pages);

    // When: Registering a getSettings handler
    let result = builder.native::<GetSettings, _>(FixedSettings);

    // Then: Rejected
    assert!(matches!(result, Err(RegistryError::WrongContext { .. })));
}

/// WHAT: Registering the same command twice fails
/// WHY: One native handler per command
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_registered_handler_when_registering_again_then_already_registered() {
    // Given: A builder with getSettings registered
    let harness = Harness::start(Parts::default());
    let builder = table_builder(ExecutionContext::ApplicationPage, &harness.bus, &harness.pages)
        .native::<GetSettings, _>(FixedSettings)
        .unwrap();

    // When: Registering it again
    let result = builder.native::<GetSettings, _>(FixedSettings);

    // Then: Rejected
    assert!(matches!(result, Err(RegistryError::AlreadyRegistered { .. })));
}

/// WHAT: A context whose table lacks a native it should own reports a routing error
/// WHY: Misconfiguration must surface as a typed error at call time
#[tokio::test]
async fn given_table_without_registered_native_when_invoking_then_routing_error() {
    // Given: An application page table with no handlers
    let harness = Harness::start(Parts::default());
    let bare = table_builder(ExecutionContext::ApplicationPage, &harness.bus, &harness.pages).build();

    // When: Reading settings
    let result = bare.invoke::<GetSettings>(()).await;

    // Then: Routing error
    assert!(matches!(result, Err(DispatchError::Routing { .. })));
}

/// WHAT: Configuration failures are recognisable through the remote error
/// WHY: Callers redirect to settings on this error specifically
#[tokio::test]
async fn given_no_credential_when_toggling_from_background_then_is_configuration() {
    // Given: No settings stored
    let harness = Harness::start(Parts::default());

    // When: The background toggles recording
    let result = harness.background.invoke::<ToggleRecording>(()).await;

    // Then: The error is the recorder's configuration error
    assert!(result.is_err_and(|e| e.is_configuration()));
}
