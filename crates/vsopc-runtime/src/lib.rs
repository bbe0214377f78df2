//! The runtime's half of the `Object` contract (spec §6): `Object_new`,
//! `Object_init`, and the six `Object_*` I/O methods the lowerer never
//! defines, built as a static archive and handed to the linker
//! alongside every compiled program's object file.
//!
//! There is no garbage collector here — `Object_new` and `inputLine`
//! both allocate with `malloc` and nothing ever frees; VSOP programs
//! are short-lived and the process exit reclaims everything.

#![allow(non_snake_case)]

use std::ffi::CStr;
use std::io::{self, Read, Write};
use std::os::raw::c_char;
use std::sync::Mutex;

#[repr(C)]
pub struct Object {
    vtable: *const ObjectVTable,
}

#[repr(C)]
struct ObjectVTable {
    print: extern "C" fn(*mut Object, *const c_char) -> *mut Object,
    print_bool: extern "C" fn(*mut Object, bool) -> *mut Object,
    print_int32: extern "C" fn(*mut Object, i32) -> *mut Object,
    input_line: extern "C" fn(*mut Object) -> *const c_char,
    input_bool: extern "C" fn(*mut Object) -> bool,
    input_int32: extern "C" fn(*mut Object) -> i32,
}

static OBJECT_VTABLE: ObjectVTable = ObjectVTable {
    print: Object_print,
    print_bool: Object_printBool,
    print_int32: Object_printInt32,
    input_line: Object_inputLine,
    input_bool: Object_inputBool,
    input_int32: Object_inputInt32,
};

#[no_mangle]
pub extern "C" fn Object_new() -> *mut Object {
    unsafe {
        let raw = libc::malloc(std::mem::size_of::<Object>()) as *mut Object;
        Object_init(raw)
    }
}

#[no_mangle]
pub extern "C" fn Object_init(this: *mut Object) -> *mut Object {
    if this.is_null() {
        return this;
    }
    unsafe {
        (*this).vtable = &OBJECT_VTABLE;
    }
    this
}

#[no_mangle]
pub extern "C" fn Object_print(this: *mut Object, s: *const c_char) -> *mut Object {
    if !s.is_null() {
        let text = unsafe { CStr::from_ptr(s) };
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let _ = handle.write_all(text.to_bytes());
        let _ = handle.flush();
    }
    this
}

#[no_mangle]
pub extern "C" fn Object_printBool(this: *mut Object, b: bool) -> *mut Object {
    print!("{}", if b { "true" } else { "false" });
    let _ = io::stdout().flush();
    this
}

#[no_mangle]
pub extern "C" fn Object_printInt32(this: *mut Object, i: i32) -> *mut Object {
    print!("{i}");
    let _ = io::stdout().flush();
    this
}

#[no_mangle]
pub extern "C" fn Object_inputLine(this: *mut Object) -> *const c_char {
    let _ = this;
    let mut line = Vec::new();
    while let Some(b) = next_byte() {
        if b == b'\n' {
            break;
        }
        line.push(b);
    }
    alloc_cstring(&line)
}

#[no_mangle]
pub extern "C" fn Object_inputBool(this: *mut Object) -> bool {
    let _ = this;
    skip_whitespace();
    let mut word = String::new();
    while let Some(b) = next_byte() {
        if b.is_ascii_alphabetic() {
            word.push(b as char);
        } else {
            push_back(b);
            break;
        }
    }
    word.eq_ignore_ascii_case("true")
}

#[no_mangle]
pub extern "C" fn Object_inputInt32(this: *mut Object) -> i32 {
    let _ = this;
    skip_whitespace();
    let mut text = String::new();
    if let Some(b) = next_byte() {
        if b == b'-' || b == b'+' || b.is_ascii_digit() {
            text.push(b as char);
        } else {
            push_back(b);
        }
    }
    while let Some(b) = next_byte() {
        if b.is_ascii_digit() {
            text.push(b as char);
        } else {
            push_back(b);
            break;
        }
    }
    text.parse().unwrap_or(0)
}

/// One byte of pushback shared across `input*` calls, so a token read
/// by `inputInt32`/`inputBool` can leave the delimiter for the next
/// read instead of swallowing it.
static PUSHBACK: Mutex<Vec<u8>> = Mutex::new(Vec::new());

fn next_byte() -> Option<u8> {
    if let Some(b) = PUSHBACK.lock().unwrap().pop() {
        return Some(b);
    }
    let mut buf = [0u8; 1];
    match io::stdin().lock().read(&mut buf) {
        Ok(1) => Some(buf[0]),
        _ => None,
    }
}

fn push_back(b: u8) {
    PUSHBACK.lock().unwrap().push(b);
}

fn skip_whitespace() {
    while let Some(b) = next_byte() {
        if !b.is_ascii_whitespace() {
            push_back(b);
            break;
        }
    }
}

fn alloc_cstring(bytes: &[u8]) -> *const c_char {
    unsafe {
        let len = bytes.len();
        let ptr = libc::malloc(len + 1) as *mut u8;
        if ptr.is_null() {
            return std::ptr::null();
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, len);
        *ptr.add(len) = 0;
        ptr as *const c_char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_object_installs_the_vtable() {
        let obj = Object_new();
        assert!(!obj.is_null());
        unsafe {
            assert!(!(*obj).vtable.is_null());
        }
    }

    #[test]
    fn init_on_null_is_a_no_op() {
        assert!(Object_init(std::ptr::null_mut()).is_null());
    }

    #[test]
    fn alloc_cstring_is_nul_terminated() {
        let ptr = alloc_cstring(b"hi");
        let text = unsafe { CStr::from_ptr(ptr) };
        assert_eq!(text.to_bytes(), b"hi");
    }
}
