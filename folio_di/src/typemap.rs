use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

#[derive(Debug, Default)]
pub struct TypeMap(HashMap<TypeId, Box<dyn Any>>);

impl TypeMap {
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.0
            .get(&TypeId::of::<T>())
            .and_then(|x| x.downcast_ref())
    }

    pub fn insert<T: 'static>(&mut self, x: T) {
        self.0.insert(TypeId::of::<T>(), Box::new(x));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_by_type() {
        let mut map = TypeMap::default();
        map.insert(7u16);
        map.insert("seven");

        assert_eq!(map.get::<u16>(), Some(&7));
        assert_eq!(map.get::<&str>(), Some(&"seven"));
        assert_eq!(map.get::<u32>(), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn insert_replaces() {
        let mut map = TypeMap::default();
        map.insert(1u8);
        map.insert(2u8);

        assert_eq!(map.get::<u8>(), Some(&2));
        assert_eq!(map.len(), 1);
    }
}
