// benches/roundtrip.rs
//! Page-level encrypt/decrypt throughput.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use hmac::Hmac;
use sha2::Sha512;

use dbcrypt_rs::consts::{IV_SIZE, V4_PAGE_SIZE};
use dbcrypt_rs::page::{decrypt_page, encrypt_page, PageLayout};

type HmacSha512 = Hmac<Sha512>;

const ENC_KEY: [u8; 32] = [0x42; 32];
const MAC_KEY: [u8; 32] = [0x24; 32];

fn bench_page(c: &mut Criterion) {
    let layout = PageLayout::new(V4_PAGE_SIZE, 64);
    let data_end = layout.page_size() - layout.reserve();

    let mut plain = vec![0x5au8; layout.page_size()];
    plain[data_end..].fill(0);
    plain[data_end..data_end + IV_SIZE].fill(0x11);

    let encrypted = encrypt_page::<HmacSha512>(&plain, &ENC_KEY, &MAC_KEY, 1, &layout).unwrap();

    let mut group = c.benchmark_group("page");
    group.throughput(Throughput::Bytes(layout.page_size() as u64));
    group.bench_function("encrypt", |b| {
        b.iter(|| {
            encrypt_page::<HmacSha512>(black_box(&plain), &ENC_KEY, &MAC_KEY, 1, &layout).unwrap()
        })
    });
    group.bench_function("decrypt", |b| {
        b.iter(|| {
            decrypt_page::<HmacSha512>(black_box(&encrypted), &ENC_KEY, &MAC_KEY, 1, &layout)
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_page);
criterion_main!(benches);
