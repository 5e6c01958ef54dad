use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use video_code_rename::code_rename::extract_code;

const FILENAMES: [&str; 8] = [
    "ADN-566.mp4",
    "xxxx.com@ADN-566.mp4",
    "DMAT044F.mkv",
    "SITE.DMAT044.C.avi",
    "[HD]ABP-1234_1080P.mp4",
    "ADN-566HD.wmv",
    "home_video_2023.mp4",
    "Some.Long.Release.Name.2023.1080p.WEB-DL.x264.mkv",
];

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_code", |b| {
        b.iter(|| {
            for name in FILENAMES {
                black_box(extract_code(black_box(name)));
            }
        });
    });

    c.bench_function("extract_code_unrecognized", |b| {
        b.iter(|| black_box(extract_code(black_box("home_video_2023.mp4"))));
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
