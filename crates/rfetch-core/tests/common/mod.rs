pub mod redirect_server;
