use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Write named columns to a CSV file.
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], data: &[Vec<f64>]) -> io::Result<()> {
    if !headers.is_empty() && !data.is_empty() && headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }

    let mut file = File::create(path)?;

    writeln!(file, "{}", headers.join(","))?;

    let n_rows = data.iter().map(|col| col.len()).max().unwrap_or(0);

    for i in 0..n_rows {
        let row: Vec<String> = data
            .iter()
            .map(|col| {
                if i < col.len() {
                    format!("{:.15e}", col[i])
                } else {
                    String::new()
                }
            })
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    Ok(())
}

/// Write a single column of data with a header.
pub fn write_single_column<P: AsRef<Path>>(path: P, header: &str, data: &[f64]) -> io::Result<()> {
    write_csv(path, &[header], &[data.to_vec()])
}

/// Write x-y data pairs.
pub fn write_xy<P: AsRef<Path>>(
    path: P,
    x_header: &str,
    y_header: &str,
    x_data: &[f64],
    y_data: &[f64],
) -> io::Result<()> {
    if x_data.len() != y_data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "X and Y data lengths don't match ({} vs {})",
                x_data.len(),
                y_data.len()
            ),
        ));
    }
    write_csv(
        path,
        &[x_header, y_header],
        &[x_data.to_vec(), y_data.to_vec()],
    )
}

/// Write a Newton convergence history as (iteration, residual norm) rows.
pub fn write_history<P: AsRef<Path>>(path: P, history: &[(u32, f64)]) -> io::Result<()> {
    let iters: Vec<f64> = history.iter().map(|(i, _)| f64::from(*i)).collect();
    let residuals: Vec<f64> = history.iter().map(|(_, r)| *r).collect();
    write_xy(path, "iter", "residual", &iters, &residuals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_csv() {
        let path = "test_output.csv";
        let headers = &["y", "chord", "gamma"];
        let data = vec![
            vec![-8.0, 0.0, 8.0],
            vec![6.1, 4.6, 1.5],
            vec![0.1, 0.3, 0.1],
        ];

        write_csv(path, headers, &data).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("y,chord,gamma"));

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_write_history() {
        let path = "test_history.csv";
        write_history(path, &[(0, 1.0), (1, 0.01)]).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("iter,residual"));
        fs::remove_file(path).ok();
    }
}
