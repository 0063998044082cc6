use criterion::{criterion_group, criterion_main, Criterion};

use parlor_chess::{MoveGenerator, Position};

fn perft_startpos(c: &mut Criterion) {
    let generator = MoveGenerator::new();
    c.bench_function("perft 3 from the starting position", |b| {
        b.iter(|| {
            let mut position = Position::start();
            generator.perft(&mut position, 3)
        })
    });
}

fn perft_kiwipete(c: &mut Criterion) {
    let generator = MoveGenerator::new();
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    c.bench_function("perft 2 from a tactical middlegame", |b| {
        b.iter(|| {
            let mut position = Position::from_fen(fen).unwrap();
            generator.perft(&mut position, 2)
        })
    });
}

criterion_group!(benches, perft_startpos, perft_kiwipete);
criterion_main!(benches);
