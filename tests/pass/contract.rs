use dbc::contract;

#[contract(pre(!slice.is_empty()), post(|max| slice.contains(max)))]
fn max<T: Ord + Copy>(slice: &[T]) -> T {
    let mut max = slice[0];

    for &value in slice {
        if value > max {
            max = value;
        }
    }

    max
}

#[contract(pre(index < v.len()), mutated(v.len() > 0))]
fn swap_first(v: &mut [u8], index: usize) {
    v.swap(0, index);
}

#[contract(post(|r| !r.is_empty()))]
fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or(s)
}

#[dbc::contract(pre(n < 20))]
fn factorial(n: u64) -> u64 {
    (1..=n).product()
}

fn main() {
    assert_eq!(max(&[3, 7, 1]), 7);

    let mut bytes = [1, 2, 3];
    swap_first(&mut bytes, 2);
    assert_eq!(bytes, [3, 2, 1]);

    assert_eq!(first_word("hello world"), "hello");
    assert_eq!(factorial(5), 120);
}
