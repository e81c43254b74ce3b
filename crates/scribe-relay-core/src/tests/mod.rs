mod support;
mod table;
