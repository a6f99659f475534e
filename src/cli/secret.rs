use gantry::core::{GantryError, GantryResult, SecretStore};
use std::io::{self, Write};

pub fn set(name: String) -> GantryResult<()> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(GantryError::Secret("Secret name cannot be empty".to_string()));
    }

    print!("Value for '{}': ", name);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    let value = value.trim().to_string();

    if value.is_empty() {
        return Err(GantryError::Secret("Secret value cannot be empty".to_string()));
    }

    SecretStore::store(&name, &value)?;

    println!();
    println!("✓ Secret '{}' stored securely", name);
    println!("  Reference it from gallery.yaml as $${}$$", name);

    Ok(())
}

pub fn delete(name: String) -> GantryResult<()> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(GantryError::Secret("Secret name cannot be empty".to_string()));
    }

    SecretStore::delete(&name)?;
    println!("✓ Secret '{}' removed", name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_rejects_empty_name() {
        let result = set("   ".to_string());
        assert!(matches!(result, Err(GantryError::Secret(_))));
    }

    #[test]
    fn test_delete_rejects_empty_name() {
        let result = delete(String::new());
        assert!(matches!(result, Err(GantryError::Secret(_))));
    }

    #[test]
    fn test_delete_missing_secret_is_an_error() {
        let result = delete("definitely_nonexistent_gantry_secret".to_string());
        assert!(result.is_err());
    }
}
