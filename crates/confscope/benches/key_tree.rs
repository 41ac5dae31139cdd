//! Benchmarks for tree building and report rendering.
//!
//! Run with: `cargo bench --bench key_tree`

use confscope::provider::{MemoryProvider, Provider};
use confscope::{ConfigRoot, HostEnvironment, HostReport, TerminalRenderer, normalize, tree, value};
use divan::{Bencher, black_box};

fn main() {
    divan::main();
}

/// `layers` providers, each defining `keys` keys spread over a few sections.
fn config(layers: usize, keys: usize) -> ConfigRoot {
    let providers = (0..layers)
        .map(|layer| {
            Box::new(
                (0..keys)
                    .map(|i| {
                        (
                            format!("Section{}:Group{}:Key{i}", i % 8, i % 3),
                            format!("value-{layer}-{i}"),
                        )
                    })
                    .collect::<MemoryProvider>(),
            ) as Box<dyn Provider>
        })
        .collect();

    ConfigRoot::new(providers)
}

#[divan::bench(args = [10, 100, 1000])]
fn build_tree(bencher: Bencher, keys: usize) {
    let config = config(4, keys);

    bencher.bench(|| {
        let entries = normalize::normalize(config.provider_list(), true);
        black_box(tree::build(&entries, &config))
    });
}

#[divan::bench(args = [10, 100])]
fn render_report(bencher: Bencher, keys: usize) {
    let config = config(4, keys);
    let host = HostEnvironment::detect("bench", "1.0.0");

    bencher.bench(|| {
        let report = HostReport::new(&host, &config).expect("options");
        let mut renderer = TerminalRenderer::plain(Vec::with_capacity(64 * 1024));
        report.display(&mut renderer).expect("render");
        black_box(renderer.into_inner())
    });
}

#[divan::bench(args = [
    "8080",
    "True",
    "Server=db;Database=orders;Password=hunter2;",
    "https://example.com/path",
    "just a plain string value",
])]
fn classify(raw: &str) -> value::FormattedValue {
    value::classify(black_box(raw), true)
}
