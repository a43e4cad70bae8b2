//! XPI signing
//!
//! Adds a JAR style signature: `META-INF/manifest.mf` lists MD5 and SHA1
//! digests of every file, `META-INF/zigbert.sf` digests the manifest sections,
//! and `META-INF/zigbert.rsa` is a detached PKCS#7 signature of the `.sf` file.
//! Must run after every other change to the package.

use super::files::Files;
use crate::error::PackagerError;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use openssl::hash::{hash, MessageDigest};
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::PKey;
use openssl::stack::Stack;
use openssl::x509::X509;
use std::fs;
use std::path::Path;

pub const MANIFEST_PATH: &str = "META-INF/manifest.mf";
pub const SIGNATURE_FILE_PATH: &str = "META-INF/zigbert.sf";
pub const SIGNATURE_PATH: &str = "META-INF/zigbert.rsa";

fn digest(data: &[u8]) -> Result<String, PackagerError> {
    let md5 = hash(MessageDigest::md5(), data)?;
    let sha1 = hash(MessageDigest::sha1(), data)?;
    Ok(format!(
        "Digest-Algorithms: MD5 SHA1\nMD5-Digest: {}\nSHA1-Digest: {}\n",
        STANDARD.encode(&*md5),
        STANDARD.encode(&*sha1)
    ))
}

/// Contents of `manifest.mf` and `zigbert.sf` for the current package.
pub fn digest_manifests(files: &Files) -> Result<(String, String), PackagerError> {
    let mut manifest = Vec::new();
    let mut signature = Vec::new();
    let mut add_section = |manifest_data: String, prefix: String| -> Result<(), PackagerError> {
        signature.push(format!("{}{}", prefix, digest(manifest_data.as_bytes())?));
        manifest.push(manifest_data);
        Ok(())
    };

    add_section("Manifest-Version: 1.0\n".to_string(), "Signature-Version: 1.0\n".to_string())?;
    for (name, data) in files.iter() {
        add_section(
            format!("Name: {}\n{}", name, digest(data)?),
            format!("Name: {}\n", name),
        )?;
    }
    Ok((manifest.join("\n"), signature.join("\n")))
}

/// Detached binary PKCS#7 signature over `data`.
///
/// `key_data` holds a PEM private key followed by the signing certificate and
/// any intermediate certificates.
pub fn pkcs7_signature(key_data: &[u8], data: &[u8]) -> Result<Vec<u8>, PackagerError> {
    let key = PKey::private_key_from_pem(key_data)?;
    let certs = X509::stack_from_pem(key_data)?;
    let (signer, chain) = certs
        .split_first()
        .ok_or_else(|| PackagerError::Signing("no certificate in key file".to_string()))?;

    let mut extra = Stack::new()?;
    for cert in chain {
        extra.push(cert.clone())?;
    }
    let pkcs7 = Pkcs7::sign(
        signer,
        &key,
        &extra,
        data,
        Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY,
    )?;
    Ok(pkcs7.to_der()?)
}

/// Sign the package with the key and certificates in `key_file`.
pub fn sign_files(files: &mut Files, key_file: &Path) -> Result<()> {
    let key_data = fs::read(key_file)
        .with_context(|| format!("Failed to read key file {}", key_file.display()))?;

    let (manifest, signature) = digest_manifests(files)?;
    let signature_block = pkcs7_signature(&key_data, signature.as_bytes())?;

    files.put(MANIFEST_PATH, manifest);
    files.put(SIGNATURE_FILE_PATH, signature);
    files.put(SIGNATURE_PATH, signature_block);
    tracing::debug!("Signed {} files", files.len() - 3);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::PathFilter;
    use openssl::asn1::Asn1Time;
    use openssl::bn::BigNum;
    use openssl::rsa::Rsa;
    use openssl::x509::X509NameBuilder;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn key_file_pem() -> Vec<u8> {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "geckopack test").unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
        builder.set_not_after(&Asn1Time::days_from_now(1).unwrap()).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();
        let cert = builder.build();

        let mut pem = key.private_key_to_pem_pkcs8().unwrap();
        pem.extend(cert.to_pem().unwrap());
        pem
    }

    #[test]
    fn test_digest_format() {
        assert_eq!(
            digest(b"").unwrap(),
            "Digest-Algorithms: MD5 SHA1\nMD5-Digest: 1B2M2Y8AsgTpgAmY7PhCfg==\nSHA1-Digest: 2jmj7l5rSw0yVb/vlWAYkK/YBwk=\n"
        );
    }

    #[test]
    fn test_digest_manifests_lists_every_file() {
        let mut files = Files::new(PathFilter::default());
        files.put("b.js", "b");
        files.put("a.js", "a");

        let (manifest, signature) = digest_manifests(&files).unwrap();
        assert!(manifest.starts_with("Manifest-Version: 1.0\n\nName: a.js\n"));
        assert!(manifest.contains("\nName: b.js\n"));
        assert!(signature.starts_with("Signature-Version: 1.0\nDigest-Algorithms: MD5 SHA1\n"));
        assert_eq!(signature.matches("Name: ").count(), 2);
    }

    #[test]
    fn test_sign_files_adds_members() {
        let temp_dir = TempDir::new().unwrap();
        let key_path = temp_dir.path().join("key.pem");
        fs::write(&key_path, key_file_pem()).unwrap();

        let mut files = Files::new(PathFilter::default());
        files.put("bootstrap.js", "startup();");
        sign_files(&mut files, &key_path).unwrap();

        assert!(files.contains(MANIFEST_PATH));
        assert!(files.contains(SIGNATURE_FILE_PATH));
        let der = files.get(SIGNATURE_PATH).unwrap();
        assert!(Pkcs7::from_der(der).is_ok());
    }

    #[test]
    fn test_invalid_key_is_signing_failure() {
        let temp_dir = TempDir::new().unwrap();
        let key_path = temp_dir.path().join("key.pem");
        fs::write(&key_path, "not a key").unwrap();

        let mut files = Files::new(PathFilter::default());
        files.put("bootstrap.js", "startup();");
        let err = sign_files(&mut files, &key_path).unwrap_err();

        assert!(matches!(err.downcast_ref::<PackagerError>(), Some(PackagerError::Signing(_))));
        assert!(!files.contains(MANIFEST_PATH));
    }
}
