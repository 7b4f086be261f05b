const POLYNOMIAL: u8 = 0x31;
const INIT: u8 = 0xFF;

/// CRC-8 as used by Sensirion: polynomial `0x31`, init `0xFF`, msb first
/// and no final xor.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
