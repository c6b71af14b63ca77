//! IP address and geo point providers.

use rand::Rng;

/// Write a dotted-quad IPv4 address, each octet in `[0, 255)`.
pub fn write_ipv4<R: Rng>(rng: &mut R, buf: &mut Vec<u8>) {
    let mut fmt = itoa::Buffer::new();
    for i in 0..4 {
        if i > 0 {
            buf.push(b'.');
        }
        let octet: u8 = rng.random_range(0..255);
        buf.extend_from_slice(fmt.format(octet).as_bytes());
    }
}

/// Write a `lat,lon` pair with two decimal places.
///
/// The fractional part is zero at the poles and the antimeridian so the
/// coordinates stay in bounds.
pub fn write_geo_point<R: Rng>(rng: &mut R, buf: &mut Vec<u8>) {
    write_coordinate(rng, 90, buf);
    buf.push(b',');
    write_coordinate(rng, 180, buf);
}

fn write_coordinate<R: Rng>(rng: &mut R, bound: i32, buf: &mut Vec<u8>) {
    let whole = rng.random_range(-bound..=bound);
    let fraction: u8 = if whole.abs() == bound {
        0
    } else {
        rng.random_range(0..100)
    };

    let mut fmt = itoa::Buffer::new();
    buf.extend_from_slice(fmt.format(whole).as_bytes());
    buf.push(b'.');
    if fraction < 10 {
        buf.push(b'0');
    }
    buf.extend_from_slice(fmt.format(fraction).as_bytes());
}
