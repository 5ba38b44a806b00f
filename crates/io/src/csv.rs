// CSV roster import

use std::io::Read;
use std::path::Path;

use crate::error::IoError;
use crate::roster::GridRow;

/// Read a delimited text file into rows of cells, each tagged with the
/// physical line its record starts on.
///
/// The delimiter is sniffed from the first lines; bytes that are not valid
/// UTF-8 are decoded as Windows-1252.
pub(crate) fn read_grid(path: &Path) -> Result<Vec<GridRow>, IoError> {
    let content = read_file_as_utf8(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = sniff_delimiter(content);
    grid_from_str(content, delimiter).map_err(|message| IoError::Read {
        path: path.to_path_buf(),
        message,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// Each candidate (semicolon, comma, tab, pipe) is scored by how many lines share the
/// first line's field count, weighted by that count. Multi-line quoted cells are parsed
/// as whole records, so a roster with line breaks inside cells still sniffs correctly.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b';', b',', b'\t', b'|'];

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = ::csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes())
            .records()
            .take(10)
            .map(|r| r.map(|r| r.len()).unwrap_or(1))
            .collect();

        // A viable delimiter splits the header row
        let target = match counts.first() {
            Some(&n) if n > 1 => n,
            _ => continue,
        };

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports)
fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn grid_from_str(content: &str, delimiter: u8) -> Result<Vec<GridRow>, String> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        let line = record
            .position()
            .map_or(idx + 1, |pos| pos.line() as usize);
        grid.push(GridRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn sniff_semicolon_delimiter() {
        let content = "Imię;Nazwisko;12.05.25 09:00 - 12:00\nAnna;Nowak;x\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_comma_delimiter() {
        let content = "Imię,Nazwisko,Termin\nAnna,Nowak,x\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn sniff_tab_delimiter() {
        let content = "Imię\tNazwisko\tTermin\nAnna\tNowak\tx\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn sniff_semicolon_with_commas_in_quoted_cells() {
        let content = "Imię;Nazwisko;T1\nAnna;Nowak;\"Placówka: SP 1, Sala: 101\"\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn multi_line_cells_survive() {
        let content = "Imię,Nazwisko,T1\nAnna,Nowak,\"Placówka: SP 1\nSala: 101\"\n";
        let grid = grid_from_str(content, b',').unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1].cells[2], "Placówka: SP 1\nSala: 101");
    }

    #[test]
    fn rows_keep_their_physical_line() {
        let content = "Imię,Nazwisko,T1\nAnna,Nowak,\"Placówka: SP 1\nSala: 101\"\nJan,Kowalski,x\n";
        let grid = grid_from_str(content, b',').unwrap();
        let lines: Vec<usize> = grid.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn windows_1252_fallback() {
        let mut file = NamedTempFile::new().unwrap();
        // "Imię" is not encodable in 1252; use a Latin-1 name instead
        file.write_all(b"Imi\xe9;Nazwisko\nJos\xe9;Garc\xeda\n").unwrap();
        let grid = read_grid(file.path()).unwrap();
        assert_eq!(grid[0].cells[0], "Imié");
        assert_eq!(grid[1].cells[1], "García");
    }

    #[test]
    fn byte_order_mark_is_stripped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("\u{feff}Imię;Nazwisko\nAnna;Nowak\n".as_bytes()).unwrap();
        let grid = read_grid(file.path()).unwrap();
        assert_eq!(grid[0].cells[0], "Imię");
    }
}
