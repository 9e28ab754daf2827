use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::str::FromStr;
use umbra_numeric::{ops, BigInt, Numeric};

fn bench_numeric_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("Numeric Operations");

    let short1 = Numeric::from(12345i64);
    let short2 = Numeric::from(67890i64);

    let long1 = Numeric::from_str("100000000000000000000.125").unwrap();
    let long2 = Numeric::from_str("200000000000000000000.5").unwrap();

    // Native + Native
    group.bench_function("add_short_short", |b| {
        b.iter(|| {
            let res = black_box(&short1) + black_box(&short2);
            black_box(res);
        })
    });

    // Native + Decimal
    group.bench_function("add_short_long", |b| {
        b.iter(|| {
            let res = black_box(&short1) + black_box(&long1);
            black_box(res);
        })
    });

    // Decimal + Decimal
    group.bench_function("add_long_long", |b| {
        b.iter(|| {
            let res = black_box(&long1) + black_box(&long2);
            black_box(res);
        })
    });

    group.bench_function("mul_long_long", |b| {
        b.iter(|| {
            let res = black_box(&long1) * black_box(&long2);
            black_box(res);
        })
    });

    group.bench_function("div_long_long", |b| {
        b.iter(|| {
            let res = ops::divide(black_box(&long2), black_box(&long1));
            black_box(res).unwrap();
        })
    });

    // Compare Native vs Native
    group.bench_function("cmp_short_short", |b| {
        b.iter(|| {
            let res = black_box(&short1).total_cmp(black_box(&short2));
            black_box(res);
        })
    });

    // Compare Native vs Decimal
    group.bench_function("cmp_short_long", |b| {
        b.iter(|| {
            let res = black_box(&short1).total_cmp(black_box(&long1));
            black_box(res);
        })
    });

    group.finish();
}

fn bench_big_int(c: &mut Criterion) {
    let mut group = c.benchmark_group("BigInt Operations");

    let a = BigInt::from_str(&"987654321".repeat(12)).unwrap();
    let b = BigInt::from_str(&"123456789".repeat(6)).unwrap();
    let modulus = BigInt::from_str("618970019642690137449562111").unwrap();

    group.bench_function("div_rem", |bench| {
        bench.iter(|| black_box(black_box(&a).div_rem(black_box(&b)).unwrap()))
    });

    group.bench_function("to_string", |bench| {
        bench.iter(|| black_box(black_box(&a).to_string()))
    });

    group.bench_function("mod_pow", |bench| {
        bench.iter(|| black_box(black_box(&b).mod_pow(&a, &modulus).unwrap()))
    });

    group.bench_function("is_probable_prime", |bench| {
        bench.iter(|| black_box(black_box(&modulus).is_probable_prime(100)))
    });

    group.finish();
}

criterion_group!(benches, bench_numeric_ops, bench_big_int);
criterion_main!(benches);
