use vrsync_shared::{Address64, Instantiator, PrefabRef, Transform};

#[derive(Debug, Clone, PartialEq)]
pub struct TestInstance {
    pub prefab: String,
    pub transform: Transform,
}

/// Records every instantiate and dispose instead of building scene objects
#[derive(Default)]
pub struct TestInstantiator {
    pub instantiated: Vec<(Address64, String)>,
    pub disposed: Vec<Address64>,
}

impl TestInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.instantiated.len() - self.disposed.len()
    }

    pub fn prefab_at(&self, address: &Address64) -> Option<&str> {
        self.instantiated
            .iter()
            .rev()
            .find(|(at, _)| at == address)
            .map(|(_, prefab)| prefab.as_str())
    }
}

impl Instantiator for TestInstantiator {
    type Instance = TestInstance;

    fn instantiate(
        &mut self,
        prefab: &PrefabRef,
        address: Address64,
        transform: &Transform,
    ) -> TestInstance {
        self.instantiated.push((address, prefab.as_str().to_string()));
        TestInstance {
            prefab: prefab.as_str().to_string(),
            transform: *transform,
        }
    }

    fn dispose(&mut self, address: Address64, _: TestInstance) {
        self.disposed.push(address);
    }
}
