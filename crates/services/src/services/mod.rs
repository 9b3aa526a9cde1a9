pub mod entity_forms;
pub mod form_session;
pub mod http_gateway;
pub mod list_query;
