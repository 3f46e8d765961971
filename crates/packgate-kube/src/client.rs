//! The release client: install-or-upgrade and uninstall against a named release

use packgate_core::{LoadedPack, ReleaseIdentity, ReleaseInfo, TemplateContext, Values};
use tracing::{error, info};

use crate::error::{KubeError, Result};
use crate::release::StoredRelease;
use crate::render::Engine;
use crate::resources::ManifestApplier;
use crate::storage::StorageDriver;

/// Release lifecycle client
///
/// One instance is built per inbound call with a fresh cluster context; the
/// storage driver and applier decide where records and resources land. Every
/// cluster operation is attempted exactly once - failures surface to the
/// caller verbatim.
pub struct ReleaseClient<S: StorageDriver, A: ManifestApplier> {
    storage: S,
    applier: A,
    engine: Engine,
}

impl<S: StorageDriver, A: ManifestApplier> ReleaseClient<S, A> {
    /// Create a client from a storage driver and manifest applier
    pub fn new(storage: S, applier: A) -> Self {
        Self {
            storage,
            applier,
            engine: Engine::new(),
        }
    }

    /// Install the release if absent, upgrade it in place if present.
    ///
    /// `tree` is the caller's parameter tree; the pack's default values sit
    /// underneath it for rendering. The namespace is not created, and the
    /// call returns as soon as the control plane accepts the resources -
    /// workload readiness is not awaited.
    pub async fn install_or_upgrade(
        &self,
        pack: &LoadedPack,
        identity: &ReleaseIdentity,
        tree: Values,
    ) -> Result<StoredRelease> {
        match self.storage.get(&identity.namespace, &identity.name).await {
            Ok(existing) => self.upgrade(pack, identity, existing, tree).await,
            Err(KubeError::ReleaseNotFound { .. }) => self.install(pack, identity, tree).await,
            Err(e) => Err(e),
        }
    }

    async fn install(
        &self,
        pack: &LoadedPack,
        identity: &ReleaseIdentity,
        tree: Values,
    ) -> Result<StoredRelease> {
        info!(release = %identity, "installing release");

        let manifest = self.render(pack, &tree, ReleaseInfo::for_install(identity))?;
        let mut release = StoredRelease::for_install(
            identity,
            pack.pack.metadata.clone(),
            tree,
            manifest,
        );

        self.storage.create(&release).await?;

        if let Err(e) = self
            .applier
            .apply(&release.namespace, &release.manifest)
            .await
        {
            error!(release = %identity, "install failed: {e}");
            release.mark_failed(e.to_string());
            self.storage.update(&release).await?;
            return Err(e);
        }

        release.mark_deployed();
        self.storage.update(&release).await?;

        info!(release = %identity, revision = release.version, "release installed");
        Ok(release)
    }

    async fn upgrade(
        &self,
        pack: &LoadedPack,
        identity: &ReleaseIdentity,
        existing: StoredRelease,
        tree: Values,
    ) -> Result<StoredRelease> {
        info!(release = %identity, revision = existing.version + 1, "upgrading release");

        let manifest = self.render(
            pack,
            &tree,
            ReleaseInfo::for_upgrade(identity, existing.version + 1),
        )?;
        let mut release = StoredRelease::for_upgrade(&existing, tree, manifest);

        self.storage.update(&release).await?;

        if let Err(e) = self
            .applier
            .apply(&release.namespace, &release.manifest)
            .await
        {
            error!(release = %identity, "upgrade failed: {e}");
            release.mark_failed(e.to_string());
            self.storage.update(&release).await?;
            return Err(e);
        }

        release.mark_deployed();
        self.storage.update(&release).await?;

        info!(release = %identity, revision = release.version, "release upgraded");
        Ok(release)
    }

    /// Remove a release and its resources.
    ///
    /// Uninstalling a release that does not exist is an error, not a no-op.
    pub async fn uninstall(&self, identity: &ReleaseIdentity) -> Result<StoredRelease> {
        info!(release = %identity, "uninstalling release");

        let release = self.storage.get(&identity.namespace, &identity.name).await?;

        if let Err(e) = self
            .applier
            .delete(&release.namespace, &release.manifest)
            .await
        {
            error!(release = %identity, "uninstall failed: {e}");
            let mut failed = release;
            failed.mark_failed(e.to_string());
            self.storage.update(&failed).await?;
            return Err(e);
        }

        self.storage.delete(&identity.namespace, &identity.name).await?;

        info!(release = %identity, "release uninstalled");
        Ok(release)
    }

    fn render(&self, pack: &LoadedPack, tree: &Values, info: ReleaseInfo) -> Result<String> {
        let values = Values::with_defaults(pack.default_values.clone(), tree);
        let context = TemplateContext::new(values, info, &pack.pack.metadata);
        self.engine.render_pack(pack, &context)
    }
}
