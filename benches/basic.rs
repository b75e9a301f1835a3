use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use uartkit::{DataBits, MockDevice, Parity, StopBits, Uart};

pub fn bench_baud_lookup(c: &mut Criterion) {
    c.bench_function("baud_lookup", |b| {
        b.iter(|| {
            for rate in [50u32, 9600, 115200, 3_000_000, 14400] {
                black_box(uartkit::BaudRate::from_u32(black_box(rate)));
            }
        })
    });
}

pub fn bench_set_mode(c: &mut Criterion) {
    let mut uart = Uart::with_device(MockDevice::new("MOCK0"));
    c.bench_function("set_mode_mock", |b| {
        b.iter(|| {
            uart.set_mode(DataBits::Seven, Parity::Even, StopBits::Two).unwrap();
            uart.set_mode(DataBits::Eight, Parity::None, StopBits::One).unwrap();
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2));
    targets = bench_baud_lookup, bench_set_mode
}
criterion_main!(benches);
