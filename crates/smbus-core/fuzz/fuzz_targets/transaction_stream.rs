#![no_main]

use libfuzzer_sys::fuzz_target;
use smbus_core::{BusAddress, DeviceSnapshot, RegisterFileDevice, SmbusBus, REGISTER_FILE_SIZE};

fuzz_target!(|data: &[u8]| {
    let address = BusAddress::XCALIBUR;
    let Ok(mut bus) = SmbusBus::new().with_device(RegisterFileDevice::at(address)) else {
        return;
    };

    for chunk in data.chunks(8) {
        let Some((&op, rest)) = chunk.split_first() else {
            continue;
        };
        match op % 4 {
            0 => {
                let _ = bus.quick_command(address, op & 0x80 != 0);
            }
            1 => {
                let _ = bus.write(address, rest);
            }
            2 => {
                let _ = bus.read(address, usize::from(op >> 2));
            }
            _ => bus.reset_all(),
        }
    }

    if let Some(device) = bus.device(address) {
        assert_eq!(device.registers().len(), REGISTER_FILE_SIZE);
        let restored = DeviceSnapshot::from_device(device).into_device();
        assert_eq!(restored.as_ref(), Ok(device));
    }
});
