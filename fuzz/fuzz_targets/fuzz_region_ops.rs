#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rectsplit::{Rect, RectSet};

#[derive(Debug, Arbitrary)]
struct FuzzRect {
    x: i8,
    y: i8,
    w: i8,
    h: i8,
}

impl FuzzRect {
    fn rect(&self) -> Rect {
        Rect::new(
            i32::from(self.x),
            i32::from(self.y),
            i32::from(self.w),
            i32::from(self.h),
        )
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    InsertStrict(FuzzRect),
    Delete(FuzzRect),
    InsertFuzzy(FuzzRect, u8),
    InsertAndMerge(FuzzRect, u8, u8),
    MergeRects(Vec<FuzzRect>, u8),
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut strict = RectSet::new();
    let mut fuzzy = RectSet::new();
    // Every cell inserted into the fuzzy set and not deleted since.
    let mut painted: Vec<Rect> = Vec::new();

    for op in ops.iter().take(256) {
        match op {
            Op::InsertStrict(r) => {
                let _ = strict.insert_strict(r.rect());
            }
            Op::Delete(r) => {
                let r = r.rect();
                strict.delete(r);
                fuzzy.delete(r);
                painted.clear();
            }
            Op::InsertFuzzy(r, e) => {
                let r = r.rect();
                let e = i64::from(*e) * 4;
                if let Ok(marker) = fuzzy.insert_fuzzy(r, e) {
                    painted.push(r);
                    fuzzy.merge_after(marker, e).expect("valid budget");
                }
            }
            Op::InsertAndMerge(r, s, m) => {
                let r = r.rect();
                if fuzzy
                    .insert_fuzzy_and_merge(r, i64::from(*s), i64::from(*m) * 4)
                    .is_ok()
                {
                    painted.push(r);
                }
            }
            Op::MergeRects(rs, e) => {
                let rects: Vec<Rect> = rs.iter().take(8).map(FuzzRect::rect).collect();
                if fuzzy.merge_rects(rects.iter().copied(), i64::from(*e)).is_ok() {
                    painted.extend(rects);
                }
            }
            Op::Clear => {
                strict.clear();
                fuzzy.clear();
                painted.clear();
            }
        }

        // Post-conditions that must always hold:
        assert_eq!(strict.arena().live_count(), strict.len(), "strict leak");
        assert_eq!(fuzzy.arena().live_count(), fuzzy.len(), "fuzzy leak");
        assert!(strict.iter().all(|r| !r.is_degenerate()));
        assert!(fuzzy.iter().all(|r| !r.is_degenerate()));
    }

    assert_eq!(strict.overlap_area(), 0, "strict members overlap");
    for r in &painted {
        for y in r.top()..r.bottom() {
            for x in r.left()..r.right() {
                assert!(fuzzy.contains_point(x, y), "({x}, {y}) of {r} lost");
            }
        }
    }
});
