use crate::error::{PdfError, Result};
use crate::objects::{Object, ObjectId};
use std::collections::BTreeMap;

/// The set of indirect objects making up a document.
///
/// Object numbers start at 1, grow monotonically and are never reused.
/// Iteration is in ascending id order, which is also serialization order.
/// Once frozen (at document finalization) every mutation fails with
/// [`PdfError::FrozenDocument`].
#[derive(Debug)]
pub struct ObjectGraph {
    objects: BTreeMap<ObjectId, Object>,
    next_number: u32,
    frozen: bool,
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_number: 1,
            frozen: false,
        }
    }

    /// Registers an object and returns its freshly assigned id.
    pub fn register(&mut self, object: Object) -> Result<ObjectId> {
        let id = self.reserve()?;
        self.objects.insert(id, object);
        Ok(id)
    }

    /// Allocates an id whose object will be supplied later via [`set`].
    ///
    /// The slot holds `Object::Null` until then, so a reserved id always
    /// resolves. Needed for forward references (a page's /Parent points at the
    /// page tree registered around it).
    ///
    /// [`set`]: ObjectGraph::set
    pub fn reserve(&mut self) -> Result<ObjectId> {
        if self.frozen {
            return Err(PdfError::FrozenDocument("register object"));
        }
        let id = ObjectId::new(self.next_number, 0);
        self.next_number += 1;
        self.objects.insert(id, Object::Null);
        Ok(id)
    }

    /// Replaces the object stored under a previously allocated id.
    pub fn set(&mut self, id: ObjectId, object: Object) -> Result<()> {
        if self.frozen {
            return Err(PdfError::FrozenDocument("replace object"));
        }
        match self.objects.get_mut(&id) {
            Some(slot) => {
                *slot = object;
                Ok(())
            }
            None => Err(PdfError::DanglingReference(id)),
        }
    }

    pub fn resolve(&self, id: ObjectId) -> Result<&Object> {
        self.objects
            .get(&id)
            .ok_or(PdfError::DanglingReference(id))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Highest object number handed out so far.
    pub fn max_number(&self) -> u32 {
        self.next_number - 1
    }

    /// Objects in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut graph = ObjectGraph::new();
        let a = graph.register(Object::Integer(1)).unwrap();
        let b = graph.register(Object::Integer(2)).unwrap();
        let c = graph.register(Object::Integer(3)).unwrap();

        assert_eq!(a.number(), 1);
        assert_eq!(b.number(), 2);
        assert_eq!(c.number(), 3);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.max_number(), 3);
    }

    #[test]
    fn test_ids_unique_and_increasing() {
        let mut graph = ObjectGraph::new();
        let mut last = 0;
        for i in 0..100 {
            let id = graph.register(Object::Integer(i)).unwrap();
            assert!(id.number() > last);
            last = id.number();
        }
    }

    #[test]
    fn test_resolve() {
        let mut graph = ObjectGraph::new();
        let id = graph.register(Object::Name("Catalog".to_string())).unwrap();

        assert_eq!(
            graph.resolve(id).unwrap(),
            &Object::Name("Catalog".to_string())
        );
    }

    #[test]
    fn test_resolve_dangling_reference() {
        let graph = ObjectGraph::new();
        let err = graph.resolve(ObjectId::new(42, 0)).unwrap_err();

        assert!(matches!(
            err,
            PdfError::DanglingReference(id) if id.number() == 42
        ));
    }

    #[test]
    fn test_reserve_and_set() {
        let mut graph = ObjectGraph::new();
        let id = graph.reserve().unwrap();

        // a reserved slot resolves as Null until filled
        assert_eq!(graph.resolve(id).unwrap(), &Object::Null);

        graph.set(id, Object::Integer(7)).unwrap();
        assert_eq!(graph.resolve(id).unwrap(), &Object::Integer(7));
    }

    #[test]
    fn test_set_unknown_id_fails() {
        let mut graph = ObjectGraph::new();
        let err = graph
            .set(ObjectId::new(9, 0), Object::Integer(1))
            .unwrap_err();
        assert!(matches!(err, PdfError::DanglingReference(_)));
    }

    #[test]
    fn test_frozen_graph_rejects_mutation() {
        let mut graph = ObjectGraph::new();
        let id = graph.register(Object::Integer(1)).unwrap();
        graph.freeze();

        assert!(matches!(
            graph.register(Object::Integer(2)),
            Err(PdfError::FrozenDocument(_))
        ));
        assert!(matches!(
            graph.set(id, Object::Integer(3)),
            Err(PdfError::FrozenDocument(_))
        ));

        // reads still work
        assert_eq!(graph.resolve(id).unwrap(), &Object::Integer(1));
    }

    #[test]
    fn test_iter_ascending_order() {
        let mut graph = ObjectGraph::new();
        for i in 0..10 {
            graph.register(Object::Integer(i)).unwrap();
        }

        let numbers: Vec<u32> = graph.iter().map(|(id, _)| id.number()).collect();
        let mut sorted = numbers.clone();
        sorted.sort_unstable();
        assert_eq!(numbers, sorted);
    }
}
