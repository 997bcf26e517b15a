use std::cell::RefCell;
use std::{cell, env};

mod shutdown;

fn main() {
    env::set_var("MODE", "prod");
    let flag = RefCell::new(false);
    if *flag.borrow() {
        shutdown::stop(1);
    }
    std::process::exit(0);
}
