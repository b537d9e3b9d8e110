// benches/infobox.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use scotus_salience::keys;
use scotus_salience::wiki::infobox;

fn sample_page() -> String {
    // Lead text, a full infobox, then a long body that cites other cases
    let mut page = String::from("'''Roe v. Wade''', 410 U.S. 113 (1973), was a landmark decision.\n");
    page.push_str(
        "{{Infobox SCOTUS case\n\
         | Litigants = Roe v. Wade\n\
         | ArgueDate = December 13 | ArgueYear = 1971\n\
         | DecideDate = January 22 | DecideYear = 1973\n\
         | FullName = Jane Roe, ''et al.'' v. Henry Wade, District Attorney of Dallas County\n\
         | USVol = 410 | USPage = 113\n\
         | ParallelCitations = 93 [[S. Ct.]] 705; 35 [[L. Ed. 2d]] 147; 1973 [[LexisNexis|U.S. LEXIS]] 159\n\
         | Docket = 70-18\n\
         | Prior = Judgment for plaintiffs, {{small|314 F. Supp. 1217}} (N.D. Tex. 1970)<ref>cite</ref>\n\
         | Holding = The Due Process Clause protects a [[right to privacy]].<!-- hidden -->\n\
         | Majority = Blackmun | JoinMajority = Burger, Douglas, Brennan, Stewart, Marshall, Powell\n\
         }}\n",
    );
    for i in 0..400 {
        page.push_str(&format!(
            "Paragraph {i} discussing [[Planned Parenthood v. Casey|Casey]], 505 U.S. 833 (1992), \
             and [https://example.org/{i} commentary].\n"
        ));
    }
    page
}

fn bench_infobox(c: &mut Criterion) {
    let page = sample_page();

    c.bench_function("find_infobox", |b| {
        b.iter(|| black_box(infobox::find_infobox(black_box(&page)).map(str::len)))
    });

    c.bench_function("extract_fields", |b| {
        b.iter(|| black_box(infobox::extract_fields(black_box(&page))))
    });

    let cites = ["410 U.S. 113", " 410 U. S. 113 ", "592 U.S. ___", "No. 70\u{2013}18"];
    c.bench_function("join_keys", |b| {
        b.iter(|| {
            for raw in &cites {
                black_box(keys::citation_key(black_box(raw)));
                black_box(keys::docket_key(black_box(raw)));
            }
        })
    });
}

criterion_group!(benches, bench_infobox);
criterion_main!(benches);
