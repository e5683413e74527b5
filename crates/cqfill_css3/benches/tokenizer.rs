use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cqfill_css3::tokenizer::Tokenizer;
use cqfill_shared::byte_stream::{ByteStream, Location};

const FIXTURE: &str = r#"
@container sidebar (min-width: 400px) {
    .card { padding: 2cqw; color: red; }
    .card::before { content: "wide"; }
}
@media screen and (min-width: 600px) {
    .grid { display: grid; grid-template-columns: repeat(3, 1fr); }
}
.hero { background: url(https://example.com/hero.png) no-repeat; width: calc(100% - 2em); }
"#;

fn tokenize(input: &str) {
    let mut stream = ByteStream::new(None);
    stream.read_from_str(input);
    stream.close();

    let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
    loop {
        let token = tokenizer.consume();
        if token.token_type == cqfill_css3::tokenizer::TokenType::Eof {
            break;
        }
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("tokenization", |b| {
        b.iter(|| tokenize(black_box(FIXTURE)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
