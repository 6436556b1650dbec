#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use capture_npz::npz::npy::{read_npy, to_npy_bytes};

fuzz_target!(|data: &[u8]| {
    // Malformed streams must be rejected with an error, never a panic
    if let Ok(array) = read_npy(&mut Cursor::new(data), "fuzz") {
        // Anything that decodes must re-encode to a stable byte stream.
        // Compared as bytes since NaN elements are never equal as floats.
        let bytes = to_npy_bytes(&array);
        let again = read_npy(&mut Cursor::new(&bytes), "fuzz").expect("re-encoded array must decode");
        assert_eq!(to_npy_bytes(&again), bytes);
    }
});
