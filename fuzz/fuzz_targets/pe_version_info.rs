#![no_main]

use libfuzzer_sys::fuzz_target;
use versentry_inventory::PeVersionReader;

fuzz_target!(|data: &[u8]| {
    // 임의 바이트에 대해 Ok/Err만 반환하고 범위 밖 접근이 없어야 함
    let _ = PeVersionReader::parse(data);
});
