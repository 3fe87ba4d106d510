//! A portable test oracle that walks a small synthetic object graph.
//!
//! Shallow sizes are fixed per type so expected totals are easy to compute by
//! hand. Distinct objects are identified by address, and cycles are broken by
//! a visited set, per the `SizeOracle::deep_size_of` contract.

#![allow(dead_code)] // not every test binary uses every helper

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use memmeter::{BufferState, ClassifyFn, Contribution, Measurable, SizeOracle};

pub const LEAF_SHALLOW: u64 = 16;
pub const NODE_SHALLOW: u64 = 24;
pub const SOFT_REF_SHALLOW: u64 = 32;
pub const BUFFER_SHALLOW: u64 = 48;
pub const BACKING_HEADER: u64 = 16;
pub const HOLDER_HEADER: u64 = 16;
pub const VEC_HEADER: u64 = 24;

// ----------------------------------------------------------------------------

pub struct Leaf;
impl Measurable for Leaf {}

#[derive(Default)]
pub struct Node {
    pub next: RefCell<Option<Rc<Node>>>,
}

impl Node {
    /// `len` nodes linked head -> ... -> tail.
    pub fn chain(len: usize) -> Rc<Self> {
        assert!(len > 0);
        let mut head = Rc::new(Node::default());
        for _ in 1..len {
            let node = Rc::new(Node::default());
            *node.next.borrow_mut() = Some(head);
            head = node;
        }
        head
    }
}

impl Measurable for Node {}

/// Weak/soft-style wrapper around a node.
pub struct SoftRef {
    pub target: Rc<Node>,
}

impl Measurable for SoftRef {
    fn is_reference_wrapper(&self) -> bool {
        true
    }
}

/// Backing storage shared by buffer views.
pub struct Backing {
    pub bytes: Vec<u8>,
}

impl Backing {
    pub fn with_capacity(capacity: usize) -> Rc<Self> {
        Rc::new(Self {
            bytes: vec![0; capacity],
        })
    }
}

impl Measurable for Backing {}

/// A buffer view over (part of) a [`Backing`].
pub struct TestBuffer {
    pub backing: Rc<Backing>,
    pub remaining: u64,
    pub off_heap: bool,
}

impl TestBuffer {
    pub fn full(backing: Rc<Backing>) -> Self {
        let remaining = backing.bytes.len() as u64;
        Self {
            backing,
            remaining,
            off_heap: false,
        }
    }

    pub fn slice(backing: Rc<Backing>, remaining: u64) -> Self {
        Self {
            backing,
            remaining,
            off_heap: false,
        }
    }

    pub fn direct(backing: Rc<Backing>, remaining: u64) -> Self {
        Self {
            backing,
            remaining,
            off_heap: true,
        }
    }
}

impl Measurable for TestBuffer {
    fn buffer_state(&self) -> Option<BufferState> {
        Some(BufferState {
            capacity: self.backing.bytes.len() as u64,
            remaining: self.remaining,
            off_heap: self.off_heap,
        })
    }
}

/// A container referencing arbitrary objects.
pub struct Holder {
    pub children: Vec<Rc<dyn Measurable>>,
}

impl Measurable for Holder {}

pub fn holder_shallow(children: usize) -> u64 {
    HOLDER_HEADER + 8 * children as u64
}

/// The oracle reports its negative sentinel for this type.
pub struct Imprecise;
impl Measurable for Imprecise {}

// ----------------------------------------------------------------------------

/// Walks the synthetic graph by downcasting to the test types above.
pub struct GraphOracle;

impl SizeOracle for GraphOracle {
    fn size_of(&self, obj: &dyn Measurable) -> i64 {
        shallow(obj)
    }

    fn deep_size_of(&self, obj: &dyn Measurable, classify: &mut ClassifyFn<'_>) -> i64 {
        let mut visited = HashSet::new();
        walk(obj, classify, &mut visited)
    }
}

pub fn bind_test_oracle() {
    memmeter::bind_size_oracle(Arc::new(GraphOracle));
}

fn shallow(obj: &dyn Measurable) -> i64 {
    let any: &dyn Any = obj;
    if any.downcast_ref::<Imprecise>().is_some() {
        return -1;
    }
    // Covers `TestBuffer` and the bind-time canary alike.
    if obj.buffer_state().is_some() {
        return BUFFER_SHALLOW as i64;
    }
    if any.downcast_ref::<Leaf>().is_some() {
        return LEAF_SHALLOW as i64;
    }
    if any.downcast_ref::<Node>().is_some() {
        return NODE_SHALLOW as i64;
    }
    if any.downcast_ref::<SoftRef>().is_some() {
        return SOFT_REF_SHALLOW as i64;
    }
    if let Some(backing) = any.downcast_ref::<Backing>() {
        return (BACKING_HEADER + backing.bytes.len() as u64) as i64;
    }
    if let Some(holder) = any.downcast_ref::<Holder>() {
        return holder_shallow(holder.children.len()) as i64;
    }
    if let Some(bytes) = any.downcast_ref::<Vec<u8>>() {
        return (VEC_HEADER + bytes.len() as u64) as i64;
    }
    if let Some(longs) = any.downcast_ref::<Vec<i64>>() {
        return (VEC_HEADER + 8 * longs.len() as u64) as i64;
    }
    if let Some(nodes) = any.downcast_ref::<Vec<Rc<Node>>>() {
        return (VEC_HEADER + 8 * nodes.len() as u64) as i64;
    }
    // Everything else by its in-memory layout.
    std::mem::size_of_val(obj) as i64
}

fn address(obj: &dyn Measurable) -> usize {
    obj as *const dyn Measurable as *const () as usize
}

fn walk(obj: &dyn Measurable, classify: &mut ClassifyFn<'_>, visited: &mut HashSet<usize>) -> i64 {
    if !visited.insert(address(obj)) {
        return 0;
    }

    match classify(obj) {
        Contribution::Skip => 0,
        Contribution::Bytes(n) => n as i64,
        Contribution::ShallowOnly => shallow(obj),
        Contribution::Traverse => {
            let own = shallow(obj);
            if own < 0 {
                return -1;
            }
            let mut total = own;
            let mut recurse = |child: &dyn Measurable, total: &mut i64| -> bool {
                let sub = walk(child, classify, visited);
                if sub < 0 {
                    *total = -1;
                    false
                } else {
                    *total += sub;
                    true
                }
            };

            let any: &dyn Any = obj;
            if let Some(node) = any.downcast_ref::<Node>() {
                if let Some(next) = node.next.borrow().as_ref() {
                    recurse(&**next, &mut total);
                }
            } else if let Some(soft) = any.downcast_ref::<SoftRef>() {
                recurse(&*soft.target, &mut total);
            } else if let Some(buffer) = any.downcast_ref::<TestBuffer>() {
                // Off-heap storage is invisible to the walker.
                if !buffer.off_heap {
                    recurse(&*buffer.backing, &mut total);
                }
            } else if let Some(holder) = any.downcast_ref::<Holder>() {
                for child in &holder.children {
                    if !recurse(&**child, &mut total) {
                        break;
                    }
                }
            } else if let Some(nodes) = any.downcast_ref::<Vec<Rc<Node>>>() {
                for node in nodes {
                    if !recurse(&**node, &mut total) {
                        break;
                    }
                }
            }
            total
        }
    }
}
