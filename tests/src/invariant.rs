use dbc::invariant;

#[derive(Debug)]
pub struct Stack {
    items: Vec<u32>,
    capacity: usize,
}

#[invariant(self.items.len() <= self.capacity)]
impl Stack {
    pub fn new(capacity: usize) -> Self {
        Stack {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn overfull(capacity: usize) -> Stack {
        Stack {
            items: vec![0; capacity + 1],
            capacity,
        }
    }

    pub fn push(&mut self, value: u32) {
        self.items.push(value);
    }

    /// Pushes first and evicts afterwards, so the stack is over capacity in between.
    pub fn push_evicting(&mut self, value: u32) {
        self.force_push(value);

        if self.items.len() > self.capacity {
            self.items.remove(0);
        }
    }

    #[contract(pre(!self.items.is_empty()))]
    pub fn pop(&mut self) -> Option<u32> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn top_mut(&mut self) -> Option<&mut u32> {
        self.items.last_mut()
    }

    pub fn shrink(&mut self) {
        self.capacity = self.capacity.saturating_sub(1);
    }

    pub fn into_items(self) -> Vec<u32> {
        self.items
    }

    fn force_push(&mut self, value: u32) {
        self.items.push(value);
    }
}

#[invariant(self.items.len() <= self.capacity)]
impl Extend<u32> for Stack {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for value in iter {
            self.items.push(value);
        }
    }
}

#[invariant(self.items.len() <= self.capacity)]
impl Default for Stack {
    fn default() -> Self {
        Stack::new(4)
    }
}

struct Connection {
    open: bool,
}

#[invariant(!self.open)]
impl Drop for Connection {
    fn drop(&mut self) {}
}

#[test]
fn invariant_holds() {
    let mut stack = Stack::new(2);

    stack.push(1);
    stack.push(2);
    *stack.top_mut().expect("stack is not empty") = 3;

    assert_eq!(stack.pop(), Some(3));
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.into_items(), [1]);
}

#[test]
fn private_methods_are_unchecked() {
    let mut stack = Stack::new(1);

    stack.push(1);
    stack.push_evicting(2);

    assert_eq!(stack.into_items(), [2]);
}

#[test]
#[should_panic(expected = "in Stack::overfull: invariant postcondition: self.items.len() <= self.capacity")]
fn constructor_result_is_checked() {
    Stack::overfull(1);
}

#[test]
#[should_panic(expected = "in Stack::push: invariant postcondition: self.items.len() <= self.capacity")]
fn violated_after_method() {
    let mut stack = Stack::new(1);

    stack.push(1);
    stack.push(2);
}

#[test]
#[should_panic(expected = "in Stack::shrink: invariant postcondition: self.items.len() <= self.capacity")]
fn violated_by_field_change() {
    let mut stack = Stack::new(1);

    stack.push(1);
    stack.shrink();
}

#[test]
#[should_panic(expected = "in Stack::len: invariant precondition: self.items.len() <= self.capacity")]
fn violated_before_method() {
    let mut stack = Stack::new(1);

    stack.force_push(1);
    stack.force_push(2);
    stack.len();
}

#[test]
#[should_panic(expected = "in Stack::pop: precondition: !self.items.is_empty()")]
fn contract_and_invariant_combined() {
    Stack::new(1).pop();
}

#[test]
#[should_panic(expected = "in Stack::extend: invariant postcondition: self.items.len() <= self.capacity")]
fn trait_methods_are_checked() {
    let mut stack = Stack::new(2);

    stack.extend(vec![1, 2, 3]);
}

#[test]
fn trait_constructor() {
    let stack = Stack::default();

    assert_eq!(stack.capacity, 4);
}

#[test]
fn drop_of_valid_value() {
    drop(Connection { open: false });
}

#[test]
#[should_panic(expected = "in Connection::drop: invariant precondition: !self.open")]
fn drop_is_checked() {
    drop(Connection { open: true });
}
