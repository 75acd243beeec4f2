use super::{FormatInfo, SensorFamily};

const fn entry(
    id: i32,
    name: &'static str,
    family: SensorFamily,
    (beams_bath_max, beams_amp_max, pixels_ss_max): (usize, usize, usize),
    speed_supplied: bool,
    description: &'static str,
) -> FormatInfo {
    FormatInfo {
        id,
        name,
        family,
        beams_bath_max,
        beams_amp_max,
        pixels_ss_max,
        speed_supplied,
        description,
    }
}

/// Every registered swath format, ordered by id
pub(super) const FORMATS: &[FormatInfo] = &[
    entry(11, "SBSIOMRG", SensorFamily::SeaBeam, (16, 0, 0), false,
        "SeaBeam, 16 beam, bathymetry, binary, uncentered, SIO."),
    entry(12, "SBSIOCEN", SensorFamily::SeaBeam, (19, 0, 0), false,
        "SeaBeam, 19 beam, bathymetry, binary, centered, SIO."),
    entry(13, "SBSIOLSI", SensorFamily::SeaBeam, (19, 0, 0), false,
        "SeaBeam, 19 beam, bathymetry, binary, centered, obsolete, SIO."),
    entry(14, "SBURICEN", SensorFamily::SeaBeam, (19, 0, 0), false,
        "SeaBeam, 19 beam, bathymetry, binary, centered, URI."),
    entry(15, "SBURIVAX", SensorFamily::SeaBeam, (19, 0, 0), false,
        "SeaBeam, 19 beam, bathymetry, binary, centered, VAX byte order, URI."),
    entry(16, "SBSIOSWB", SensorFamily::SeaBeam, (19, 0, 0), false,
        "SeaBeam, 19 beam, bathymetry, binary, centered, swath-bathy, SIO."),
    entry(17, "SBIFREMR", SensorFamily::SeaBeam, (19, 0, 0), false,
        "SeaBeam, 19 beam, bathymetry, ascii, centered, sounding-oriented, IFREMER."),
    entry(21, "HSATLRAW", SensorFamily::Hsds, (59, 59, 0), true,
        "Hydrosweep DS raw format, 59 beam, bathymetry and amplitude, ascii, Atlas Electronik."),
    entry(22, "HSLDEDMB", SensorFamily::Hsds, (59, 0, 0), false,
        "Hydrosweep DS, 59 beam, bathymetry, binary, NRL."),
    entry(23, "HSURICEN", SensorFamily::Hsds, (59, 0, 0), false,
        "Hydrosweep DS, 59 beam, bathymetry, binary, URI."),
    entry(24, "HSLDEOIH", SensorFamily::Hsds, (59, 59, 0), true,
        "Hydrosweep DS in-house format, 59 beam, bathymetry and amplitude, binary, centered, L-DEO."),
    entry(25, "HSURIVAX", SensorFamily::Hsds, (59, 0, 0), false,
        "Hydrosweep DS, 59 beam, bathymetry, binary, VAX byte order, URI."),
    entry(26, "HSUNKNWN", SensorFamily::Hsds, (59, 59, 0), false,
        "Hydrosweep DS, 59 beam, bathymetry and amplitude, ascii, unknown origin, SOPAC."),
    entry(31, "SB2000RW", SensorFamily::Sb2000, (151, 151, 2000), false,
        "SeaBeam 2000 vender format, 151 beam bathymetry and amplitude, 2000 pixel sidescan, ascii + binary, SeaBeam Instruments."),
    entry(32, "SB2000SB", SensorFamily::Sb2000, (121, 0, 0), false,
        "SeaBeam 2000, 121 beam bathymetry, binary, swath-bathy, SIO."),
    entry(33, "SB2000SS", SensorFamily::Sb2000, (0, 0, 2000), false,
        "SeaBeam 2000, 1000 pixel sidescan, binary, swath-bathy, SIO."),
    entry(41, "SB2100RW", SensorFamily::Sb2100, (151, 151, 2000), true,
        "SeaBeam 2100 series vender format, 151 beam bathymetry and amplitude, 2000 pixel sidescan, ascii + binary, centered, SeaBeam Instruments."),
    entry(42, "SB2100B1", SensorFamily::Sb2100, (151, 151, 2000), true,
        "SeaBeam 2100 series vendor format, 151 beam bathymetry and amplitude, 2000 pixel sidescan, binary, centered, SeaBeam Instruments and L-DEO."),
    entry(43, "SB2100B2", SensorFamily::Sb2100, (151, 151, 0), true,
        "SeaBeam 2100 series vendor format, 151 beam bathymetry and amplitude, binary, centered, SeaBeam Instruments and L-DEO."),
    entry(51, "EMOLDRAW", SensorFamily::Simrad, (121, 121, 4050), true,
        "Old Simrad vendor multibeam format, Simrad EM1000, EM12S, EM12D, EM121 multibeam sonars, bathymetry, amplitude, and sidescan, ascii + binary, Simrad."),
    entry(53, "EM12IFRM", SensorFamily::Simrad, (81, 81, 4050), false,
        "Simrad EM12S/EM12D multibeam archive format, 81 beam bathymetry and amplitude, binary, read-only, IFREMER."),
    entry(54, "EM12DARW", SensorFamily::Simrad, (81, 81, 0), false,
        "Simrad EM12 RRS Darwin processed format, 81 beam, bathymetry and amplitude, binary, centered, Oxford University."),
    entry(56, "EM300RAW", SensorFamily::Simrad2, (254, 254, 1024), true,
        "Simrad EM300/EM3000 multibeam vendor format, up to 254 beam bathymetry and amplitude, variable pixel sidescan, ascii + binary, Simrad."),
    entry(57, "EM300MBA", SensorFamily::Simrad2, (254, 254, 1024), true,
        "Simrad EM300/EM3000 multibeam processing format, up to 254 beam bathymetry and amplitude, variable pixel sidescan, ascii + binary, MBARI."),
    entry(58, "EM710RAW", SensorFamily::Simrad3, (400, 400, 1024), true,
        "Kongsberg EM122, EM302, EM710 multibeam vendor format, up to 400 beam bathymetry and amplitude, variable pixel sidescan, binary, Kongsberg."),
    entry(59, "EM710MBA", SensorFamily::Simrad3, (400, 400, 1024), true,
        "Kongsberg EM122, EM302, EM710 multibeam processing format, up to 400 beam bathymetry and amplitude, variable pixel sidescan, binary, MBARI."),
    entry(61, "MR1PRHIG", SensorFamily::Mr1, (1003, 0, 4003), false,
        "Obsolete MR1 post processed format, variable beam bathymetry, variable pixel sidescan, xdr binary, SOEST."),
    entry(62, "MR1ALDEO", SensorFamily::Mr1, (153, 0, 4003), false,
        "MR1 Lamont format with travel times, variable beam bathymetry, variable pixel sidescan, xdr binary, L-DEO."),
    entry(63, "MR1BLDEO", SensorFamily::Mr1B, (153, 0, 4003), false,
        "MR1 small Lamont format with travel times, variable beam bathymetry, variable pixel sidescan, xdr binary, L-DEO."),
    entry(64, "MR1PRVR2", SensorFamily::Mr1V2001, (1003, 0, 4003), false,
        "MR1 post processed format, variable beam bathymetry, variable pixel sidescan, xdr binary, SOEST."),
    entry(71, "MBLDEOIH", SensorFamily::Ldeoih, (0, 0, 0), true,
        "Generic in-house multibeam, variable beam, bathymetry, amplitude, and sidescan binary, centered, L-DEO."),
    entry(72, "MBARIMB1", SensorFamily::Ldeoih, (0, 0, 0), true,
        "Generic in-house swath bathymetry, variable beam, bathymetry only, binary, centered, MBARI."),
    entry(75, "MBNETCDF", SensorFamily::NetCdf, (0, 0, 0), false,
        "CARAIBES CDF multibeam, variable beam, netCDF, IFREMER."),
    entry(76, "MBNCDFXT", SensorFamily::NetCdf, (0, 0, 0), false,
        "CARAIBES CDF multibeam, variable beam, netCDF, IFREMER. - extended format"),
    entry(81, "CBAT9001", SensorFamily::Reson, (60, 60, 0), true,
        "Reson SeaBat 9001 multibeam, 60 beams bathymetry and amplitude, binary, University of New Brunswick."),
    entry(82, "CBAT8101", SensorFamily::Reson, (101, 101, 0), true,
        "Reson SeaBat 8101 multibeam, 101 beams bathymetry and amplitude, binary, SeaBeam Instruments."),
    entry(83, "HYPC8101", SensorFamily::Reson, (101, 101, 0), false,
        "Reson SeaBat 8101 multibeam, 101 beams bathymetry, ASCII, read-only, Coastal Oceanographics."),
    entry(84, "XTFR8101", SensorFamily::Reson8k, (250, 250, 0), false,
        "Reson SeaBat 8XXX multibeam, 250 beams bathymetry, binary, read-only, Triton-Elics XTF format."),
    entry(85, "RESONS8K", SensorFamily::Reson8k, (250, 250, 1024), false,
        "Reson SeaBat 8XXX multibeam, 250 beams bathymetry, binary, read-only, Reson 6042 format."),
    entry(86, "SBATPROC", SensorFamily::Reson8k, (250, 250, 1024), true,
        "Reson SeaBat 8XXX multibeam, 250 beams bathymetry, binary, MBARI processing format."),
    entry(88, "RESON7KR", SensorFamily::Reson7k, (254, 254, 2048), true,
        "Reson 7K multibeam vendor format, bathymetry, amplitude, three channels sidescan, and subbottom, up to 254 beams, variable pixels, binary, Reson."),
    entry(89, "RESON7K3", SensorFamily::Reson7k3, (1024, 1024, 2048), true,
        "Teledyne 7k version 3 format, bathymetry, amplitude, three channels sidescan, and subbottom, variable beams, variable pixels, binary, Teledyne."),
    entry(91, "BCHRTUNB", SensorFamily::Elac, (56, 56, 0), false,
        "Elac BottomChart multibeam, 56 beams bathymetry and amplitude, binary, University of New Brunswick."),
    entry(92, "ELMK2UNB", SensorFamily::ElacMk2, (126, 126, 0), false,
        "Elac BottomChart Mk2 multibeam, 126 beams bathymetry and amplitude, binary, University of New Brunswick."),
    entry(93, "BCHRXUNB", SensorFamily::Elac, (56, 56, 0), false,
        "Elac BottomChart multibeam, 56 beams bathymetry and amplitude, binary, University of New Brunswick."),
    entry(94, "L3XSERAW", SensorFamily::Xse, (151, 151, 2000), true,
        "ELAC/SeaBeam XSE vendor format, Bottomchart MkII 50 kHz and 180 kHz multibeam, SeaBeam 2120 20 KHz multibeam, bathymetry, amplitude and sidescan, variable beams and pixels, binary, L3 Communications (Elac Nautik and SeaBeam Instruments)."),
    entry(101, "HSMDARAW", SensorFamily::Hsmd, (79, 0, 319), false,
        "Hydrosweep MD multibeam raw format, 40 beam bathymetry, 160 pixel sidescan, xdr binary, Atlas Electronik."),
    entry(102, "HSMDLDIH", SensorFamily::Hsmd, (79, 0, 319), false,
        "Hydrosweep MD multibeam in-house format, 40 beam bathymetry, 160 pixel sidescan, binary, L-DEO."),
    entry(111, "DSL120PF", SensorFamily::Dsl, (2048, 0, 8192), false,
        "WHOI DSL AMS-120 deep-tow, 2048 beam bathymetry, 2048 pixel sidescan, binary, parallel files, WHOI DSL."),
    entry(112, "DSL120SF", SensorFamily::Dsl, (2048, 0, 8192), false,
        "WHOI DSL AMS-120 deep-tow, 2048 beam bathymetry, 2048 pixel sidescan, binary, single files, WHOI DSL."),
    entry(121, "GSFGENMB", SensorFamily::Gsf, (0, 0, 0), true,
        "SAIC Generic Sensor Format (GSF), variable beams, bathymetry and amplitude, binary, single files, SAIC."),
    entry(131, "MSTIFFSS", SensorFamily::MStiff, (0, 0, 1024), false,
        "MSTIFF sidescan format, variable pixels, sidescan, binary TIFF variant, single files, Sea Scan."),
    entry(132, "EDGJSTAR", SensorFamily::Jstar, (1, 0, 32000), false,
        "Edgetech Jstar format, variable pixels, dual frequency sidescan and subbottom, binary SEGY variant, single files, low frequency sidescan returned as survey data, Edgetech."),
    entry(133, "EDGJSTR2", SensorFamily::Jstar, (1, 0, 32000), false,
        "Edgetech Jstar format, variable pixels, dual frequency sidescan and subbottom, binary SEGY variant, single files, high frequency sidescan returned as survey data, Edgetech."),
    entry(141, "OICGEODA", SensorFamily::Oic, (1024, 256, 2048), false,
        "OIC swath sonar format, variable beam bathymetry and amplitude, variable pixel sidescan, binary, Oceanic Imaging Consultants."),
    entry(142, "OICMBARI", SensorFamily::Oic, (1024, 256, 2048), false,
        "OIC-style extended swath sonar format, variable beam bathymetry and amplitude, variable pixel sidescan, binary, MBARI."),
    entry(151, "OMGHDCSJ", SensorFamily::Hdcs, (1440, 1440, 1024), true,
        "UNB OMG HDCS format, variable beam bathymetry and amplitude, variable pixel sidescan, binary, UNB."),
    entry(160, "SEGYSEGY", SensorFamily::Singlebeam, (1, 0, 0), false,
        "SEGY seismic or subbottom trace data, single beam bathymetry, nav, binary, SEG (SIOSEIS variant)."),
    entry(161, "MGD77DAT", SensorFamily::Singlebeam, (1, 0, 0), false,
        "NGDC MGD77 underway geophysics format, single beam bathymetry, nav, magnetics, gravity, 120 byte ascii records with no line breaks, NOAA NGDC."),
    entry(162, "ASCIIXYZ", SensorFamily::Singlebeam, (1, 0, 0), false,
        "XYZ (lon lat depth) soundings, ascii, generic."),
    entry(163, "ASCIIYXZ", SensorFamily::Singlebeam, (1, 0, 0), false,
        "YXZ (lat lon depth) soundings, ascii, generic."),
    entry(164, "HYDROB93", SensorFamily::Singlebeam, (1, 0, 0), false,
        "NGDC hydrographic soundings, binary."),
    entry(165, "MBARIROV", SensorFamily::Singlebeam, (1, 0, 0), false,
        "MBARI ROV navigation format, ascii, MBARI."),
    entry(166, "MBPRONAV", SensorFamily::Singlebeam, (0, 0, 0), true,
        "MB-System simple navigation format, ascii, MBARI."),
    entry(167, "NVNETCDF", SensorFamily::NavNetCdf, (0, 0, 0), false,
        "CARAIBES CDF navigation, netCDF, IFREMER."),
    entry(168, "ASCIIXYT", SensorFamily::Singlebeam, (1, 0, 0), false,
        "XYT (lon lat topography) soundings, ascii, generic."),
    entry(169, "ASCIIYXT", SensorFamily::Singlebeam, (1, 0, 0), false,
        "YXT (lat lon topography) soundings, ascii, generic."),
    entry(170, "MBARROV2", SensorFamily::Singlebeam, (1, 0, 0), false,
        "MBARI ROV navigation format, ascii, MBARI."),
    entry(171, "HS10JAMS", SensorFamily::Hs10, (45, 45, 0), false,
        "Furuno HS10 multibeam format, 45 beams, bathymetry and amplitude, ascii, JAMSTEC."),
    entry(172, "HIR2RNAV", SensorFamily::Singlebeam, (0, 0, 0), false,
        "SIO GDC R2R navigation format, ascii, navigation, SIO."),
    entry(173, "MGD77TXT", SensorFamily::Singlebeam, (1, 0, 0), false,
        "NGDC MGD77 underway geophysics format, single beam bathymetry, nav, magnetics, gravity, 122 byte ascii records with CRLF line breaks, NOAA NGDC."),
    entry(174, "MGD77TAB", SensorFamily::Singlebeam, (1, 0, 0), false,
        "NGDC MGD77T underway geophysics format, single beam bathymetry, nav, magnetics, gravity, tab delimited ascii records with CRLF line breaks, NOAA NGDC."),
    entry(181, "SAMESURF", SensorFamily::Surf, (1440, 1440, 4096), true,
        "STN Atlas processing multibeam format, Hydrosweep DS2, Hydrosweep MD, Fansweep 10, Fansweep 20, bathymetry, amplitude, and sidescan, up to 1440 beams and 4096 pixels, XDR binary, STN Atlas."),
    entry(182, "HSDS2RAW", SensorFamily::Atlas, (1440, 1440, 4096), true,
        "STN Atlas raw multibeam format, Hydrosweep DS2, Hydrosweep MD, Fansweep 10, Fansweep 20, bathymetry, amplitude, and sidescan, up to 1440 beams and 4096 pixels, XDR binary, STN Atlas."),
    entry(183, "HSDS2LAM", SensorFamily::Atlas, (1440, 1440, 4096), true,
        "L-DEO HSDS2 processing format, STN Atlas multibeam sonars, Hydrosweep DS2, Hydrosweep MD, Fansweep 10, Fansweep 20, bathymetry, amplitude, and sidescan, up to 1440 beams and 4096 pixels, XDR binary, L-DEO."),
    entry(191, "IMAGE83P", SensorFamily::Image83p, (480, 0, 0), false,
        "Imagenex 83p vendor format for DeltaT multibeam, 480 beams bathymetry."),
    entry(192, "IMAGEMBA", SensorFamily::Image83p, (480, 0, 0), false,
        "MBARI processing format for DeltaT multibeam, 480 beams bathymetry."),
    entry(201, "HYSWEEP1", SensorFamily::Hysweep, (512, 512, 1024), true,
        "HYSWEEP format for multibeam data, variable beams, bathymetry, amplitude, and sidescan, ascii text, single files, Hypack."),
    entry(211, "XTFB1624", SensorFamily::Benthos, (0, 0, 8192), false,
        "XTF format Benthos Sidescan SIS1624, variable pixels, dual frequency sidescan and subbottom, xtf variant, single files, low frequency sidescan returned as survey data, Benthos."),
    entry(221, "SWPLSSXI", SensorFamily::SwathPlus, (8192, 8192, 0), false,
        "SEA intermediate format for SWATHplus interferometric sonar, variable beams, bathymetry, amplitude, binary, single files, SEA."),
    entry(222, "SWPLSSXP", SensorFamily::SwathPlus, (8192, 8192, 0), false,
        "SEA processed format for SWATHplus interferometric sonar, variable beams, bathymetry, amplitude, binary, single files, SEA."),
    entry(231, "3DDEPTHP", SensorFamily::ThreeDatDepthLidar, (0, 0, 0), false,
        "3DatDepth processed format for 3DatDepth LIDAR, variable beams, bathymetry, amplitude, binary, single files, 3DatDepth."),
    entry(232, "3DWISSLR", SensorFamily::ThreeDdWissl1, (0, 0, 0), false,
        "3D at Depth vendor format for 3D at Depth WiSSL (Wide Swath Subsea Lidar), variable beams, bathymetry, amplitude, binary, single files, 3D at Depth."),
    entry(233, "3DWISSLP", SensorFamily::ThreeDdWissl1, (0, 0, 0), false,
        "3D at Depth processed format for 3D at Depth WiSSL (Wide Swath Subsea Lidar), variable beams, bathymetry, amplitude, binary, single files, MBARI."),
    entry(234, "3DWISSL2", SensorFamily::ThreeDdWissl2, (0, 0, 0), false,
        "3D at Depth vendor format for 3D at Depth WiSSL2 (Wide Swath Subsea Lidar), variable beams, bathymetry, amplitude, binary, single files, 3D at Depth."),
    entry(241, "WASSPENL", SensorFamily::Wassp, (244, 244, 2000), false,
        "WASSP Multibeam Vendor Format, WASSP multibeams, bathymetry and amplitude, 122 or 244 beams, binary, Electronic Navigation Ltd."),
    entry(251, "PHOTGRAM", SensorFamily::StereoPair, (0, 0, 0), false,
        "Stereo Photogrammetry format, stereo camera rigs, bathymetry, variable soundings, binary, MBARI."),
    entry(261, "KEMKMALL", SensorFamily::Kmbes, (1024, 1024, 0), true,
        "Kongsberg multibeam echosounder system kmall datagram format, Kongsberg fourth generation multibeam sonars (EM2040, EM712, EM304, EM124), variable beams, bathymetry, amplitude, binary, Kongsberg."),
];

/// Legacy format ids 1 through 9, indexed by the legacy id
pub(super) const LEGACY_ALIASES: [i32; 10] = [0, 11, 12, 13, 14, 21, 22, 23, 24, 71];
