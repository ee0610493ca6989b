pub mod metadata_client;
