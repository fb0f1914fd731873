use std::{collections::HashSet, hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use orthoprofile::{NFC, NFD, Profile, segment};

// Grouped-sound profile in the layout the wordlist tooling writes.
const PROFILE: &[[&str; 3]] = &[
    ["Grapheme", "Grouped", "Plain"],
    ["^", "NULL", "NULL"],
    ["$", "NULL", "NULL"],
    ["_", "NULL", "NULL"],
    ["tʰ", "tʰ", "tʰ"],
    ["kʰ", "kʰ", "kʰ"],
    ["ts_o", "ts.o", "ts o"],
    ["th_a", "th.a", "th a"],
    ["ŋ", "ŋ", "ŋ"],
    ["a", "a", "a"],
    ["ã", "ã", "ã"],
    ["o", "o", "o"],
    ["k", "k", "k"],
    ["m", "m", "m"],
];

const INPUTS: &[(&str, &str)] = &[
    ("short", "^kʰa_ŋ$"),
    ("grouped", "^ts_o_th_a_kʰa_ŋo$"),
    ("unknown_heavy", "^xyzzy_qwerty_th_a$"),
    ("diacritics", "^tʰã_ŋã_kʰõ_mã$"),
];

fn profile() -> Profile {
    Profile::builder()
        .normalization(NFC)
        .from_table(PROFILE.iter().copied())
        .expect("bench profile")
}

fn bench_segment(c: &mut Criterion) {
    let graphemes: HashSet<&str> = PROFILE[1..].iter().map(|row| row[0]).collect();
    let mut group = c.benchmark_group("segment");
    for &(name, input) in INPUTS {
        let long = input.repeat(16);
        group.throughput(Throughput::Bytes(long.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &long, |b, text| {
            b.iter(|| segment(black_box(text), &graphemes))
        });
    }
    group.finish();
}

fn bench_invoke(c: &mut Criterion) {
    let nfc = profile();
    let nfd = Profile::builder()
        .normalization(NFD)
        .from_table(PROFILE.iter().copied())
        .expect("bench profile");

    let mut group = c.benchmark_group("invoke");
    for &(name, input) in INPUTS {
        group.bench_with_input(BenchmarkId::new("nfc_grouped", name), input, |b, text| {
            b.iter(|| nfc.invoke(black_box(text), "Grouped"))
        });
        group.bench_with_input(BenchmarkId::new("nfd_plain", name), input, |b, text| {
            b.iter(|| nfd.invoke(black_box(text), "Plain"))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(3))
        .warm_up_time(Duration::from_millis(500));
    targets = bench_segment, bench_invoke
}
criterion_main!(benches);
