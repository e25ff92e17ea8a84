pub mod d400_client_report;
