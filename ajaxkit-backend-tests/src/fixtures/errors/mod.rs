mod invalid_json;
mod network;
mod unsuccessful_status;
