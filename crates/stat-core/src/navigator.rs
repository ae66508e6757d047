//! Frontera de navegación: dirección visible y redirect externo.
//!
//! El workflow vive en una página; el pago ocurre en una página ajena. Este
//! seam modela lo único que el motor necesita de la navegación: leer la
//! dirección actual, reescribirla sin recargar (retirar marcadores) y
//! entregar el control a un destino externo.
use url::Url;

pub trait Navigator {
    /// Dirección visible de la carga actual.
    fn current_location(&self) -> Url;

    /// Reemplaza la dirección visible sin recargar la página (el análogo de
    /// `history.replaceState`). Usado para retirar marcadores de retorno.
    fn replace_location(&mut self, location: Url);

    /// Entrega la navegación al destino externo. Irreversible desde la
    /// perspectiva del workflow: ningún código posterior de esta carga debe
    /// asumir que corre.
    fn redirect(&mut self, target: &Url);
}

/// Navegación simulada para tests, demos y el driver de línea de comandos.
#[derive(Debug, Clone)]
pub struct InMemoryNavigator {
    location: Url,
    redirects: Vec<Url>,
}

impl InMemoryNavigator {
    pub fn at(location: Url) -> Self {
        InMemoryNavigator { location,
                            redirects: Vec::new() }
    }

    /// Carga "en frío" sin marcadores, en un origen de prueba.
    pub fn fresh() -> Self {
        Self::at(Url::parse("https://statflow.test/").expect("static test origin"))
    }

    /// Simula volver del proveedor externo aterrizando en `location`.
    pub fn arrive(&mut self, location: Url) {
        self.location = location;
    }

    pub fn last_redirect(&self) -> Option<&Url> {
        self.redirects.last()
    }

    pub fn redirects(&self) -> &[Url] {
        &self.redirects
    }
}

impl Navigator for InMemoryNavigator {
    fn current_location(&self) -> Url {
        self.location.clone()
    }

    fn replace_location(&mut self, location: Url) {
        self.location = location;
    }

    fn redirect(&mut self, target: &Url) {
        self.redirects.push(target.clone());
    }
}
