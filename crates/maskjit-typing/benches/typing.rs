use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use maskjit_types::{BinaryOp, MaskedType, NumericPromotion, PrimitiveType, Type, TypeContext};
use maskjit_typing::{infer_function, Expr, OpKey, OperatorTable, RuleContext, TypingConfig};

fn bench_resolve(c: &mut Criterion) {
    let config = TypingConfig::default();
    let cx = RuleContext::new(&NumericPromotion, &config);
    let table = OperatorTable::global();
    let mut group = c.benchmark_group("resolve");

    let cases = [
        (
            "masked_masked",
            vec![Type::masked(PrimitiveType::Int32), Type::masked(PrimitiveType::Float64)],
        ),
        (
            "masked_null",
            vec![Type::masked(PrimitiveType::Int64), Type::Null],
        ),
        (
            "masked_scalar",
            vec![Type::masked(PrimitiveType::UInt8), PrimitiveType::Int16.into()],
        ),
    ];

    for (name, operands) in &cases {
        group.bench_with_input(BenchmarkId::new("add", name), operands, |b, operands| {
            b.iter(|| {
                table
                    .resolve(&cx, OpKey::Binary(BinaryOp::Add), black_box(operands))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_infer(c: &mut Criterion) {
    let config = TypingConfig::default();
    let params = [
        Type::masked(PrimitiveType::Float64),
        Type::masked(PrimitiveType::Int32),
        Type::Masked(MaskedType::owned_string()),
    ];
    let body = Expr::if_else(
        Expr::call(Expr::param(2), "startswith", vec![Expr::param(2)]),
        Expr::binary(BinaryOp::Mul, Expr::param(0), Expr::param(1)),
        Expr::Na,
    );

    c.bench_function("infer_string_branch", |b| {
        b.iter(|| {
            let mut ctx = TypeContext::new();
            infer_function(&mut ctx, &config, black_box(&params), black_box(&body)).unwrap()
        });
    });
}

criterion_group!(benches, bench_resolve, bench_infer);
criterion_main!(benches);
