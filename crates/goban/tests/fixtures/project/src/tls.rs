extern crate openssl;

pub fn connect() {}
