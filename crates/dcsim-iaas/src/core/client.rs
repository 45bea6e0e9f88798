//! Client surface of the provisioning service.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::common::Flavor;
use crate::core::error::ProvisioningError;
use crate::core::server::{Server, VmImage};
use crate::core::service::ProvisioningService;

/// Handle used by workload drivers to submit launch requests.
///
/// Several clients may be bound to the same service; closing one of them
/// only rejects its own future submissions, already-submitted requests are
/// unaffected.
pub struct ServiceClient {
    service: Rc<RefCell<ProvisioningService>>,
    closed: bool,
}

impl ServiceClient {
    pub(crate) fn new(service: Rc<RefCell<ProvisioningService>>) -> Self {
        Self { service, closed: false }
    }

    /// Submits a launch request for a new server and returns its handle.
    ///
    /// The completion fires once the request is accepted by a host (it may
    /// never fire if the request is cancelled or rejected). Fails with
    /// [`ProvisioningError::ClientClosed`] if this client or the service
    /// was closed before the call.
    pub fn new_server<F>(
        &mut self,
        name: &str,
        image: VmImage,
        flavor: Flavor,
        completion: F,
    ) -> Result<Rc<RefCell<Server>>, ProvisioningError>
    where
        F: FnOnce(Rc<RefCell<Server>>) + 'static,
    {
        if self.closed {
            return Err(ProvisioningError::ClientClosed);
        }
        self.service
            .borrow_mut()
            .new_server(name, image, flavor, Box::new(completion))
    }

    /// Marks the client closed. Does not cancel already-submitted requests.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
