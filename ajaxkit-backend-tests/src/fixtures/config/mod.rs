mod response_size;
