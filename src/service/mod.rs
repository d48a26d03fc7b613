pub mod credential_loader;
pub mod iam_verifier;
pub mod role_provisioner;
