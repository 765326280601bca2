use criterion::{Criterion, criterion_group, criterion_main};
use domain::{PaymentContext, PaymentEvent, PaymentRegistry, PaymentState};

fn bench_state_table(c: &mut Criterion) {
    c.bench_function("domain/on_event_all_combinations", |b| {
        b.iter(|| {
            for state in PaymentState::ALL {
                for event in PaymentEvent::ALL {
                    std::hint::black_box(state.on_event(event));
                }
            }
        });
    });
}

fn bench_context_lifecycle(c: &mut Criterion) {
    c.bench_function("domain/context_process_complete", |b| {
        b.iter(|| {
            let mut ctx = PaymentContext::new();
            ctx.process();
            ctx.complete();
            std::hint::black_box(ctx.state());
        });
    });
}

fn bench_registry_dispatch(c: &mut Criterion) {
    let registry = PaymentRegistry::new();
    for i in 0..1_000 {
        registry.create(&format!("P{i}")).unwrap();
    }

    c.bench_function("domain/registry_dispatch", |b| {
        b.iter(|| {
            registry.process("P500").unwrap();
        });
    });

    c.bench_function("domain/registry_create", |b| {
        let mut n = 0u64;
        b.iter(|| {
            n += 1;
            registry.create(&format!("NEW-{n}")).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_state_table,
    bench_context_lifecycle,
    bench_registry_dispatch
);
criterion_main!(benches);
