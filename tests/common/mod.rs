pub mod page_server;
