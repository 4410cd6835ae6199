use std::collections::HashMap;

use crate::utf8;
use crate::value::{Handle, Value};

/// A collection runs once the live-object count exceeds this threshold.
/// Fixed: the limit never adapts to the survivor ratio of a cycle.
pub const MAX_OBJ_NUM: usize = 128;

/// A heap-allocated Flan object. String keys in a table are plain `String`s
/// owned by the map, not objects, so they carry no handle and are never
/// marked on their own.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Str { text: String, utf8_len: usize },
    Atom { text: String, utf8_len: usize },
    List(Vec<Value>),
    Table(HashMap<String, Value>),
    Tuple(Box<[Value]>),
}

#[derive(Debug, Clone)]
struct Slot {
    object: Object,
    marked: bool,
}

/// Arena of all live objects plus the mark-sweep collector over it.
///
/// The arena is the sole owner of every object; `Value::Object` holds a
/// bare slot index. Sweeping a slot turns it into `None`, so a stale handle
/// can only ever observe "gone", never freed memory.
///
/// The collector holds no reference to the interpreter's stack: every call
/// that may collect takes the current root values as a borrowed slice.
pub struct Heap {
    slots: Vec<Option<Slot>>,
    free_indices: Vec<Handle>,
    live: usize,
    max_obj_num: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::with_threshold(MAX_OBJ_NUM)
    }

    pub fn with_threshold(max_obj_num: usize) -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            live: 0,
            max_obj_num,
        }
    }

    // --- Creation API ---
    //
    // These five are the only way the rest of the runtime obtains heap
    // objects. Each one registers the object first and runs the threshold
    // check second, so a fresh object that nothing roots can already be
    // reclaimed before its creation call returns.

    pub fn create_string(&mut self, text: impl Into<String>, roots: &[Value]) -> Value {
        let text = text.into();
        let utf8_len = utf8::len(&text);
        self.create(Object::Str { text, utf8_len }, roots)
    }

    pub fn create_atom(&mut self, text: impl Into<String>, roots: &[Value]) -> Value {
        let text = text.into();
        let utf8_len = utf8::len(&text);
        self.create(Object::Atom { text, utf8_len }, roots)
    }

    pub fn create_list(&mut self, elements: Vec<Value>, roots: &[Value]) -> Value {
        self.create(Object::List(elements), roots)
    }

    pub fn create_table(&mut self, map: HashMap<String, Value>, roots: &[Value]) -> Value {
        self.create(Object::Table(map), roots)
    }

    pub fn create_tuple(&mut self, values: Vec<Value>, roots: &[Value]) -> Value {
        self.create(Object::Tuple(values.into_boxed_slice()), roots)
    }

    fn create(&mut self, object: Object, roots: &[Value]) -> Value {
        let handle = self.register(object);
        self.maybe_collect(roots);
        Value::Object(handle)
    }

    /// Place an object into a free slot, or append a new one. Never
    /// collects by itself.
    fn register(&mut self, object: Object) -> Handle {
        self.live += 1;
        let slot = Slot {
            object,
            marked: false,
        };
        if let Some(handle) = self.free_indices.pop() {
            self.slots[handle as usize] = Some(slot);
            handle
        } else {
            let handle = self.slots.len() as Handle;
            self.slots.push(Some(slot));
            handle
        }
    }

    // --- Collection ---

    pub fn should_collect(&self) -> bool {
        self.live > self.max_obj_num
    }

    pub fn maybe_collect(&mut self, roots: &[Value]) {
        if self.should_collect() {
            self.collect(roots);
        }
    }

    /// Full synchronous mark-sweep cycle. On return the live slots are
    /// exactly the objects transitively reachable from `roots`, and every
    /// surviving mark flag is false again.
    pub fn collect(&mut self, roots: &[Value]) {
        self.trace(roots);
        self.sweep();
    }

    /// Mark phase: explicit work-list of pending handles. A handle whose
    /// slot is already marked (or freed) is skipped on pop, which bounds
    /// the work to live objects plus live edges and terminates on cycles.
    fn trace(&mut self, roots: &[Value]) {
        let mut worklist: Vec<Handle> = roots.iter().filter_map(Value::as_handle).collect();

        while let Some(handle) = worklist.pop() {
            let slot = match self.slots.get_mut(handle as usize) {
                Some(Some(slot)) => slot,
                _ => continue,
            };
            if slot.marked {
                continue;
            }
            slot.marked = true;

            match &slot.object {
                Object::Str { .. } | Object::Atom { .. } => {}
                Object::List(elements) => {
                    worklist.extend(elements.iter().filter_map(Value::as_handle));
                }
                Object::Table(map) => {
                    worklist.extend(map.values().filter_map(Value::as_handle));
                }
                Object::Tuple(values) => {
                    worklist.extend(values.iter().filter_map(Value::as_handle));
                }
            }
        }
    }

    /// Sweep phase: free every unmarked slot, clear the flag on survivors.
    fn sweep(&mut self) {
        for (index, entry) in self.slots.iter_mut().enumerate() {
            match entry {
                Some(slot) if slot.marked => slot.marked = false,
                Some(_) => {
                    *entry = None;
                    self.free_indices.push(index as Handle);
                    self.live -= 1;
                }
                None => {}
            }
        }
    }

    // --- Accessors ---

    pub fn get(&self, handle: Handle) -> Option<&Object> {
        self.slots
            .get(handle as usize)?
            .as_ref()
            .map(|slot| &slot.object)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Object> {
        self.slots
            .get_mut(handle as usize)?
            .as_mut()
            .map(|slot| &mut slot.object)
    }

    pub fn get_string(&self, handle: Handle) -> Option<&str> {
        match self.get(handle) {
            Some(Object::Str { text, .. }) => Some(text),
            _ => None,
        }
    }

    pub fn get_atom(&self, handle: Handle) -> Option<&str> {
        match self.get(handle) {
            Some(Object::Atom { text, .. }) => Some(text),
            _ => None,
        }
    }

    /// Cached UTF-8 code-point count of a string or atom.
    pub fn get_utf8_len(&self, handle: Handle) -> Option<usize> {
        match self.get(handle) {
            Some(Object::Str { utf8_len, .. }) | Some(Object::Atom { utf8_len, .. }) => {
                Some(*utf8_len)
            }
            _ => None,
        }
    }

    pub fn get_list(&self, handle: Handle) -> Option<&Vec<Value>> {
        match self.get(handle) {
            Some(Object::List(elements)) => Some(elements),
            _ => None,
        }
    }

    pub fn get_list_mut(&mut self, handle: Handle) -> Option<&mut Vec<Value>> {
        match self.get_mut(handle) {
            Some(Object::List(elements)) => Some(elements),
            _ => None,
        }
    }

    pub fn get_table(&self, handle: Handle) -> Option<&HashMap<String, Value>> {
        match self.get(handle) {
            Some(Object::Table(map)) => Some(map),
            _ => None,
        }
    }

    pub fn get_table_mut(&mut self, handle: Handle) -> Option<&mut HashMap<String, Value>> {
        match self.get_mut(handle) {
            Some(Object::Table(map)) => Some(map),
            _ => None,
        }
    }

    pub fn get_tuple(&self, handle: Handle) -> Option<&[Value]> {
        match self.get(handle) {
            Some(Object::Tuple(values)) => Some(values),
            _ => None,
        }
    }

    // --- Introspection ---

    /// Whether the handle still refers to a live object.
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn is_marked(&self, handle: Handle) -> bool {
        matches!(
            self.slots.get(handle as usize),
            Some(Some(slot)) if slot.marked
        )
    }

    /// Number of live objects (the registry size).
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
