mod chunked_encoding;
mod request_header_override;
