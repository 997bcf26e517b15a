use std::rc::Rc;

pub fn stop(code: i32) -> ! {
    let guard: Rc<u8> = Rc::new(0);
    drop(guard);
    let exit = std::process::exit;
    exit(code)
}
