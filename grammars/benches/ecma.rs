// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pegcst::{tokenize, CacheCapacity, ParserConfig};
use pegcst_grammars::ecma::{lexicon, EcmaParser};
use pegcst_grammars::Parser;

const SNIPPET: &str = r#"
function fib(n) {
    if (n < 2) return n
    return fib(n - 1) + fib(n - 2)
}

const cache = { hits: 0, misses: 0, "label": `fib ${fib(10)}` }
let squares = [1, 2, 3].map((x) => x * x).filter((x) => x % 2 === 1)
for (const s of squares) console.log(s / 2, /[0-9]+/g.test(`${s}`))
while (cache.hits < 10) { cache.hits++ }
"#;

fn source() -> String {
    SNIPPET.repeat(20)
}

fn benchmark(c: &mut Criterion) {
    let source = source();

    c.bench_function("ecma lex", |b| {
        b.iter(|| tokenize(lexicon(), black_box(&source)).unwrap())
    });

    for (name, cache) in [
        ("ecma parse unbounded cache", CacheCapacity::Unbounded),
        ("ecma parse default cache", CacheCapacity::default()),
        ("ecma parse small cache", CacheCapacity::bounded(64)),
        ("ecma parse without cache", CacheCapacity::Disabled),
    ] {
        let parser = EcmaParser::with_config(ParserConfig::default().with_cache(cache));
        c.bench_function(name, |b| b.iter(|| parser.parse(black_box(&source)).unwrap()));
    }
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
