#![no_main]
use ir::ProgramModel;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(dump) = serde_json::from_slice(data) {
        let model = ProgramModel::from_dump(dump);
        let _ = model.calls();
        let _ = model.to_json();
    }
});
