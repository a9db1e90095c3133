// benches/extract.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

use devchart::chart::extract::{option_lists, table_rows};
use devchart::core::html::Tokenizer;

fn sample_table(rows: usize) -> String {
    let mut doc = String::from("<html><body><table>");
    for i in 0..rows {
        doc.push_str(&format!(
            "<tr><td>Film {i}</td><td>Dev</td><td>1+{}</td><td>{}</td>\
             <td>8.5</td><td>9</td><td></td><td>20C</td>\
             <td><a href=\"/notes.php?doc=N{i}\"><img src=\"i.gif\"></a></td></tr>",
            i % 50,
            100 << (i % 4),
        ));
    }
    doc.push_str("</table></body></html>");
    doc
}

fn sample_form(options: usize) -> String {
    let mut doc = String::from("<form><select id=\"Developer\">");
    for i in 0..options {
        doc.push_str(&format!("<option value=\"Dev {i}\">Dev {i}</option>"));
    }
    doc.push_str("</select><select name=\"Film\">");
    for i in 0..options {
        doc.push_str(&format!("<option value=\"Film {i}\">Film {i}</option>"));
    }
    doc.push_str("</select></form>");
    doc
}

fn bench_extract(c: &mut Criterion) {
    let page = Url::parse("https://www.digitaltruth.com/devchart.php").unwrap();
    let table = sample_table(500);
    let form = sample_form(300);

    c.bench_function("table_rows_500", |b| {
        b.iter(|| {
            let rows = table_rows(Tokenizer::new(black_box(&table)), black_box(&page));
            black_box(rows.len())
        })
    });

    c.bench_function("option_lists_300", |b| {
        b.iter(|| {
            let options = option_lists(Tokenizer::new(black_box(&form)));
            black_box(options.developers.len())
        })
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
