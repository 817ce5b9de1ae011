use dbc::contract;
use std::num::ParseIntError;

#[contract(pre(divisor != 0), post(|quotient| *quotient <= dividend))]
fn divide(dividend: u32, divisor: u32) -> u32 {
    dividend / divisor
}

#[contract(post(|r| *r >= 0))]
fn negate(x: i32) -> i32 {
    -x
}

#[contract(pre(!v.is_empty()), mutated(v.is_empty()))]
fn pop_all(v: &mut Vec<u8>) -> usize {
    v.pop();
    v.len()
}

#[contract(post(|r| *r < 10))]
fn clamp(x: u32) -> u32 {
    if x >= 10 {
        return 10;
    }

    x
}

#[contract(pre(!s.is_empty()), post(|r| r.as_ref().map_or(true, |n| *n > 0)))]
fn parse_positive(s: &str) -> Result<u32, ParseIntError> {
    let n = s.trim().parse::<u32>()?;
    Ok(n)
}

struct Account {
    balance: i64,
}

impl Account {
    #[contract(pre(amount > 0), mutated(self.balance >= 0))]
    fn withdraw(&mut self, amount: i64) {
        self.balance -= amount;
    }
}

#[test]
fn satisfied_contract() {
    assert_eq!(divide(9, 3), 3);
    assert_eq!(negate(-4), 4);
    assert_eq!(clamp(3), 3);
}

#[test]
#[should_panic(expected = "in divide: precondition: divisor != 0")]
fn violated_precondition() {
    divide(1, 0);
}

#[test]
#[should_panic(expected = "in negate: postcondition: *r >= 0")]
fn violated_postcondition() {
    negate(5);
}

#[test]
#[should_panic(expected = "in pop_all: mutated-postcondition: v.is_empty()")]
fn violated_mutated_postcondition() {
    pop_all(&mut vec![1, 2]);
}

#[test]
fn mutated_postcondition_sees_arguments_after_the_call() {
    let mut v = vec![1];

    assert_eq!(pop_all(&mut v), 0);
    assert!(v.is_empty());
}

#[test]
#[should_panic(expected = "in clamp: postcondition: *r < 10")]
fn early_return_is_checked() {
    clamp(20);
}

#[test]
fn question_mark_in_body() {
    assert_eq!(parse_positive(" 12 "), Ok(12));
    assert!(parse_positive("twelve").is_err());
}

#[test]
#[should_panic(expected = "in parse_positive: postcondition: r.as_ref().map_or(true, |n| *n > 0)")]
fn postcondition_on_result_type() {
    let _ = parse_positive("0");
}

#[test]
fn method_contract() {
    let mut account = Account { balance: 10 };

    account.withdraw(4);

    assert_eq!(account.balance, 6);
}

#[test]
#[should_panic(expected = "in withdraw: mutated-postcondition: self.balance >= 0")]
fn violated_method_contract() {
    let mut account = Account { balance: 3 };

    account.withdraw(4);
}
