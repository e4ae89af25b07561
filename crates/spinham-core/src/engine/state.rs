use super::error::EngineError;
use super::image::SpinImage;
use std::sync::Arc;
use tracing::debug;

/// An ordered sequence of images, e.g. the path of a transition calculation.
#[derive(Debug, Clone)]
pub struct Chain {
    images: Vec<Arc<SpinImage>>,
    active_image: usize,
}

impl Chain {
    pub fn new(images: Vec<Arc<SpinImage>>) -> Result<Self, EngineError> {
        if images.is_empty() {
            return Err(EngineError::InvalidInput(
                "a chain needs at least one image".to_string(),
            ));
        }
        Ok(Self {
            images,
            active_image: 0,
        })
    }

    pub fn images(&self) -> &[Arc<SpinImage>] {
        &self.images
    }

    pub fn active_image(&self) -> usize {
        self.active_image
    }

    pub fn set_active_image(&mut self, idx_image: usize) -> Result<(), EngineError> {
        if idx_image >= self.images.len() {
            return Err(EngineError::InvalidInput(format!(
                "chain has {} images, cannot activate image {}",
                self.images.len(),
                idx_image
            )));
        }
        self.active_image = idx_image;
        Ok(())
    }
}

/// Container of all chains of a simulation. Indices left as `None` refer to the active
/// chain or image.
#[derive(Debug, Clone)]
pub struct State {
    chains: Vec<Chain>,
    active_chain: usize,
}

impl State {
    pub fn new(chains: Vec<Chain>) -> Result<Self, EngineError> {
        if chains.is_empty() {
            return Err(EngineError::InvalidInput(
                "a state needs at least one chain".to_string(),
            ));
        }
        Ok(Self {
            chains,
            active_chain: 0,
        })
    }

    /// State holding a single chain with a single image.
    pub fn from_image(image: SpinImage) -> Self {
        Self {
            chains: vec![Chain {
                images: vec![Arc::new(image)],
                active_image: 0,
            }],
            active_chain: 0,
        }
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn active_chain(&self) -> usize {
        self.active_chain
    }

    pub fn set_active_chain(&mut self, idx_chain: usize) -> Result<(), EngineError> {
        if idx_chain >= self.chains.len() {
            return Err(EngineError::ChainNotFound { idx_chain });
        }
        self.active_chain = idx_chain;
        Ok(())
    }

    pub fn chain_mut(&mut self, idx_chain: usize) -> Result<&mut Chain, EngineError> {
        self.chains
            .get_mut(idx_chain)
            .ok_or(EngineError::ChainNotFound { idx_chain })
    }

    /// Resolves optional indices to concrete `(idx_image, idx_chain)`.
    pub fn resolve_indices(
        &self,
        idx_image: Option<usize>,
        idx_chain: Option<usize>,
    ) -> Result<(usize, usize), EngineError> {
        let idx_chain = idx_chain.unwrap_or(self.active_chain);
        let chain = self
            .chains
            .get(idx_chain)
            .ok_or(EngineError::ChainNotFound { idx_chain })?;
        let idx_image = idx_image.unwrap_or(chain.active_image);
        if idx_image >= chain.images.len() {
            return Err(EngineError::ImageNotFound {
                idx_image,
                idx_chain,
            });
        }
        Ok((idx_image, idx_chain))
    }

    /// Looks up an image. The returned handle outlives any later change of the
    /// active indices.
    pub fn resolve(
        &self,
        idx_image: Option<usize>,
        idx_chain: Option<usize>,
    ) -> Result<Arc<SpinImage>, EngineError> {
        let (idx_image, idx_chain) = self.resolve_indices(idx_image, idx_chain)?;
        debug!(idx_image, idx_chain, "Resolved image.");
        Ok(Arc::clone(&self.chains[idx_chain].images[idx_image]))
    }
}
