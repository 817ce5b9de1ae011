use dbc::invariant;

/// A range that always contains its start.
struct Range<T> {
    start: T,
    end: T,
}

#[invariant(self.start <= self.end)]
impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(start: T, end: T) -> Option<Self> {
        if start <= end {
            Some(Range { start, end })
        } else {
            None
        }
    }

    pub fn point(at: T) -> Self {
        Range { start: at, end: at }
    }

    #[contract(pre(end >= self.start))]
    pub fn set_end(&mut self, end: T) {
        self.end = end;
    }

    pub fn start_mut(&mut self) -> &mut T {
        &mut self.start
    }

    pub fn contains(&self, value: T) -> bool {
        self.start <= value && value < self.end
    }
}

fn main() {
    let mut range = Range::point(1);

    range.set_end(4);
    assert!(range.contains(2));
    assert!(!range.contains(4));

    *range.start_mut() = 2;
    assert!(Range::new(3, 1).is_none());
}
