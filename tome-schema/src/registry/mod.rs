mod server;
mod server_list;

pub use server::{
    ConfigField, ConfigProperty, ConfigSchema, Connection, ConnectionType, Security, Server,
    ToolDescriptor,
};
pub use server_list::{CompactServer, DEFAULT_PAGE_SIZE, Pagination, ServerList};
